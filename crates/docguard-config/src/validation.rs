//! Configuration validation.

use crate::schema::{ConfigError, ConfigResult, DocguardConfig};

/// Validate a pipeline configuration.
pub fn validate_config(config: &DocguardConfig) -> ConfigResult<()> {
    validate_llm(config)?;
    validate_thresholds(config)?;
    validate_kinds(config)?;
    Ok(())
}

fn validate_llm(config: &DocguardConfig) -> ConfigResult<()> {
    if config.llm.timeout_seconds == 0 {
        return Err(ConfigError::Validation(
            "llm.timeout_seconds must be positive".to_string(),
        ));
    }
    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "llm.model must not be empty".to_string(),
        ));
    }
    if config.llm.base_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "llm.base_url must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_thresholds(config: &DocguardConfig) -> ConfigResult<()> {
    let t = config.thresholds;
    if !(0.0..=1.0).contains(&t.approve) {
        return Err(ConfigError::Validation(format!(
            "thresholds.approve must be in [0, 1], got {}",
            t.approve
        )));
    }
    if !(0.0..=1.0).contains(&t.escalate_max_clean) {
        return Err(ConfigError::Validation(format!(
            "thresholds.escalate_max_clean must be in [0, 1], got {}",
            t.escalate_max_clean
        )));
    }
    if t.approve >= t.escalate_max_clean {
        return Err(ConfigError::Validation(format!(
            "thresholds.approve ({}) must be below thresholds.escalate_max_clean ({})",
            t.approve, t.escalate_max_clean
        )));
    }
    Ok(())
}

fn validate_kinds(config: &DocguardConfig) -> ConfigResult<()> {
    let k = config.kinds;
    if !k.bank_statement && !k.check && !k.paystub && !k.money_order {
        return Err(ConfigError::Validation(
            "at least one document kind must be enabled".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DocguardConfig;

    #[test]
    fn test_default_config_validates() {
        assert!(validate_config(&DocguardConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = DocguardConfig::default();
        config.llm.timeout_seconds = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = DocguardConfig::default();
        config.thresholds.approve = 0.9;
        config.thresholds.escalate_max_clean = 0.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_all_kinds_disabled_rejected() {
        let mut config = DocguardConfig::default();
        config.kinds.bank_statement = false;
        config.kinds.check = false;
        config.kinds.paystub = false;
        config.kinds.money_order = false;
        assert!(validate_config(&config).is_err());
    }
}
