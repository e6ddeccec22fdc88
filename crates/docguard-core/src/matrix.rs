//! The decision matrix.
//!
//! The matrix maps (customer class, post-rule score) to the one decision
//! every path must emit. The LLM contributes reasoning and action lists;
//! the decision itself is owned by the matrix and re-enforced by the
//! assembler. The matrix is total: every (class, score) pair maps to
//! exactly one decision.

use serde::{Deserialize, Serialize};

use crate::models::{CustomerClass, Decision};

/// Configurable matrix thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Scores below this approve for new, clean, and fraud-history customers.
    pub approve: f64,
    /// Highest score a clean-history customer can escalate at; above it
    /// the matrix rejects.
    pub escalate_max_clean: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            approve: 0.30,
            escalate_max_clean: 0.85,
        }
    }
}

/// The (customer class x score) decision table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionMatrix {
    thresholds: RiskThresholds,
}

impl DecisionMatrix {
    /// Build a matrix with custom thresholds.
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// The thresholds in force.
    pub fn thresholds(&self) -> RiskThresholds {
        self.thresholds
    }

    /// The decision the matrix mandates for a class and post-rule score.
    ///
    /// A new customer is never auto-rejected on score alone: the whole
    /// band at and above the approve threshold escalates, including 1.0.
    pub fn required_decision(&self, class: CustomerClass, score: f64) -> Decision {
        let t = self.thresholds;
        match class {
            CustomerClass::New => {
                if score < t.approve {
                    Decision::Approve
                } else {
                    Decision::Escalate
                }
            }
            CustomerClass::Clean => {
                if score < t.approve {
                    Decision::Approve
                } else if score <= t.escalate_max_clean {
                    Decision::Escalate
                } else {
                    Decision::Reject
                }
            }
            CustomerClass::Fraud => {
                if score < t.approve {
                    Decision::Approve
                } else {
                    Decision::Reject
                }
            }
            CustomerClass::Repeat => Decision::Reject,
        }
    }

    /// Render the table as markdown, quoted verbatim into the LLM system
    /// prompt. The rendering reflects the thresholds in force.
    pub fn render(&self) -> String {
        let t = self.thresholds;
        format!(
            "| Customer class | Fraud risk score | Required decision |\n\
             |---|---|---|\n\
             | NEW (no history) | < {approve:.2} | APPROVE |\n\
             | NEW (no history) | >= {approve:.2} | ESCALATE |\n\
             | CLEAN (prior decisions, zero counters) | < {approve:.2} | APPROVE |\n\
             | CLEAN (prior decisions, zero counters) | {approve:.2} - {clean_max:.2} | ESCALATE |\n\
             | CLEAN (prior decisions, zero counters) | > {clean_max:.2} | REJECT |\n\
             | FRAUD (prior rejects, no escalations) | < {approve:.2} | APPROVE |\n\
             | FRAUD (prior rejects, no escalations) | >= {approve:.2} | REJECT |\n\
             | REPEAT (prior escalations) | any | REJECT |",
            approve = t.approve,
            clean_max = t.escalate_max_clean,
        )
    }
}

impl Default for DecisionMatrix {
    fn default() -> Self {
        Self::new(RiskThresholds::default())
    }
}
