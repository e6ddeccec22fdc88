//! Prompt assembly for decision synthesis.
//!
//! The system prompt quotes the decision matrix verbatim and forbids
//! free-form deviation; the user prompt carries the document field summary,
//! the ML analysis, and the customer history summary. The matrix quoting is
//! a correctness requirement, not a stylistic one: the model's
//! recommendation is validated against the same matrix after parsing.

use docguard_core::{
    CustomerSummary, DecisionMatrix, MlAnalysis, NormalizedDocument,
};

/// Anomalies quoted into the prompt, at most.
const MAX_PROMPT_ANOMALIES: usize = 8;

/// Build the system prompt for a matrix.
pub fn system_prompt(matrix: &DecisionMatrix) -> String {
    format!(
        r#"You are a senior fraud analyst reviewing OCR-extracted financial documents.
You receive the document's extracted fields, an ML fraud analysis, and the customer's history summary.

Your recommendation MUST follow this decision matrix exactly. The matrix is mandatory; do not deviate from it for any reason:

{matrix}

The customer class and fraud risk score are given in the request. Look up the required decision in the matrix and recommend exactly that decision. Your value is in the reasoning, the key indicators, and the actionable recommendations, not in overriding the matrix.

Respond with strict JSON only, no prose outside the JSON object, using exactly this shape:

{{
  "recommendation": "APPROVE" | "REJECT" | "ESCALATE",
  "confidence_score": 0.0-1.0,
  "summary": "one-paragraph assessment",
  "reasoning": ["ordered reasoning steps"],
  "key_indicators": ["the signals that drove the assessment"],
  "actionable_recommendations": ["concrete next steps for the reviewing team"]
}}"#,
        matrix = matrix.render()
    )
}

/// Build the user prompt for one request.
pub fn user_prompt(
    doc: &NormalizedDocument,
    analysis: &MlAnalysis,
    customer: &CustomerSummary,
) -> String {
    let mut sections = Vec::new();

    sections.push(format!(
        "## Document ({})\n{}",
        doc.kind(),
        document_summary(doc)
    ));

    let mut ml = format!(
        "## ML analysis\nfraud_risk_score: {:.4}\nrisk_level: {}\nmodel_confidence: {:.4}",
        analysis.score, analysis.risk_level, analysis.confidence
    );
    if !analysis.anomalies.is_empty() {
        ml.push_str("\nanomalies:");
        for anomaly in analysis.anomalies.iter().take(MAX_PROMPT_ANOMALIES) {
            ml.push_str(&format!("\n- {anomaly}"));
        }
    }
    sections.push(ml);

    sections.push(format!(
        "## Customer history\nclass: {}\nfraud_count: {}\nescalate_count: {}\nlast_decision: {}",
        customer.class,
        customer.fraud_count,
        customer.escalate_count,
        customer
            .last_decision
            .map(|d| d.as_str())
            .unwrap_or("none"),
    ));

    sections.push(
        "Apply the decision matrix to the class and score above and respond with the required JSON."
            .to_string(),
    );

    sections.join("\n\n")
}

/// Compact field summary, one `name: value` line per standardized field.
/// Absent fields are listed explicitly; absence is signal.
fn document_summary(doc: &NormalizedDocument) -> String {
    let mut lines = Vec::new();
    let mut push = |name: &str, value: Option<String>| {
        lines.push(format!(
            "{name}: {}",
            value.unwrap_or_else(|| "(absent)".to_string())
        ));
    };

    match doc {
        NormalizedDocument::BankStatement(s) => {
            push("bank_name", s.bank_name.clone());
            push("account_holder_name", s.account_holder_name.clone());
            push("account_number", s.account_number.clone());
            push("account_type", s.account_type.clone());
            push("currency", s.currency.clone());
            push(
                "statement_period",
                match (s.statement_period_start_date, s.statement_period_end_date) {
                    (Some(start), Some(end)) => Some(format!("{start} .. {end}")),
                    _ => None,
                },
            );
            push("beginning_balance", s.beginning_balance.as_ref().map(|a| a.to_string()));
            push("ending_balance", s.ending_balance.as_ref().map(|a| a.to_string()));
            push("total_credits", s.total_credits.as_ref().map(|a| a.to_string()));
            push("total_debits", s.total_debits.as_ref().map(|a| a.to_string()));
            push("transaction_count", Some(s.transactions.len().to_string()));
        }
        NormalizedDocument::Check(c) => {
            push("bank_name", c.bank_name.clone());
            push("routing_number", c.routing_number.clone());
            push("account_number", c.account_number.clone());
            push("check_number", c.check_number.clone());
            push("amount_numeric", c.amount_numeric.as_ref().map(|a| a.to_string()));
            push("amount_written", c.amount_written.clone());
            push("payer_name", c.payer_name.clone());
            push("payee_name", c.payee_name.clone());
            push("check_date", c.check_date.map(|d| d.to_string()));
            push(
                "signature_detected",
                c.signature_detected.map(|s| s.to_string()),
            );
        }
        NormalizedDocument::Paystub(p) => {
            push("employer_name", p.employer_name.clone());
            push("employee_name", p.employee_name.clone());
            push(
                "pay_period",
                match (p.pay_period_start, p.pay_period_end) {
                    (Some(start), Some(end)) => Some(format!("{start} .. {end}")),
                    _ => None,
                },
            );
            push("gross_pay", p.gross_pay.as_ref().map(|a| a.to_string()));
            push("net_pay", p.net_pay.as_ref().map(|a| a.to_string()));
            push("ytd_gross", p.ytd_gross.as_ref().map(|a| a.to_string()));
            push("ytd_net", p.ytd_net.as_ref().map(|a| a.to_string()));
        }
        NormalizedDocument::MoneyOrder(m) => {
            push("issuer_name", m.issuer_name.clone());
            push("serial_number", m.serial_number.clone());
            push("amount", m.amount.as_ref().map(|a| a.to_string()));
            push("purchaser_name", m.purchaser_name.clone());
            push("payee_name", m.payee_name.clone());
            push("issue_date", m.issue_date.map(|d| d.to_string()));
        }
    }

    lines.join("\n")
}
