use thiserror::Error;

use crate::agents::config::AgentLimits;
use crate::config::{SearchConfig, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if settings.llm.model.trim().is_empty() {
            errors.push(ValidationError::MissingField("llm.model".to_string()));
        }

        if let Some(env_var) = &settings.llm.api_key_env {
            if env_var.trim().is_empty() {
                errors.push(ValidationError::InvalidValue {
                    field: "llm.api_key_env".to_string(),
                    reason: "Environment variable name must not be empty".to_string(),
                });
            }
        }

        if let Some(temperature) = settings.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                errors.push(ValidationError::InvalidValue {
                    field: "llm.temperature".to_string(),
                    reason: "Temperature must be between 0.0 and 2.0".to_string(),
                });
            }
        }

        if let Err(e) = Self::validate_search(&settings.search) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_limits("agents", &settings.agents) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_limits("supervisor", &settings.supervisor) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_search(search: &SearchConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // A disabled provider is never launched, so its descriptor is not checked
        if !search.enabled {
            return Ok(());
        }

        if search.command.trim().is_empty() {
            errors.push(ValidationError::MissingField("search.command".to_string()));
        }

        if search.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "search.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_limits(section: &str, limits: &AgentLimits) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if limits.max_iterations == 0 {
            errors.push(ValidationError::InvalidValue {
                field: format!("{}.max_iterations", section),
                reason: "Must allow at least one iteration".to_string(),
            });
        }

        if limits.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: format!("{}.timeout_seconds", section),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
