use crate::config::Config;
use crate::error::{Result, SmartSearchError, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_session(config, &mut errors);
        Self::validate_dates(config, &mut errors);
        Self::validate_ranking(config, &mut errors);
        Self::validate_patterns(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SmartSearchError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_session(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.session.history_capacity == 0 {
            errors.push(ValidationError::new(
                "session.history_capacity",
                "History capacity must be greater than 0",
            ));
        }

        if let Some(path) = &config.session.history_file {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    "session.history_file",
                    "History file path cannot be empty",
                ));
            }
        }
    }

    fn validate_dates(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.dates.week_start().is_err() {
            errors.push(ValidationError::new(
                "dates.week_start",
                format!("Unknown weekday '{}'", config.dates.week_start),
            ));
        }
    }

    fn validate_ranking(config: &Config, errors: &mut Vec<ValidationError>) {
        let ranking = &config.ranking;

        for (path, weight) in [
            ("ranking.exact_match_weight", ranking.exact_match_weight),
            ("ranking.token_match_weight", ranking.token_match_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                errors.push(ValidationError::new(
                    path,
                    format!("Weight must be between 0.0 and 1.0, got {}", weight),
                ));
            }
        }

        if ranking.exact_match_weight + ranking.token_match_weight <= 0.0 {
            errors.push(ValidationError::new(
                "ranking",
                "At least one ranking weight must be positive",
            ));
        }

        if ranking.highlight_open.is_empty() || ranking.highlight_close.is_empty() {
            errors.push(ValidationError::new(
                "ranking.highlight_open",
                "Highlight markers cannot be empty",
            ));
        }
    }

    fn validate_patterns(config: &Config, errors: &mut Vec<ValidationError>) {
        // File existence is checked when the registry loads; paths may contain ~
        if let Some(path) = &config.patterns.keywords_file {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    "patterns.keywords_file",
                    "Keywords file path cannot be empty",
                ));
            }
        }
    }
}
