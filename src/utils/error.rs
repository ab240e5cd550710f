use thiserror::Error;

#[derive(Error, Debug)]
pub enum HouseholdError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error in '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Invalid leaderboard: {message}")]
    InvalidLeaderboard { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Storage,
    NotFound,
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl HouseholdError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        HouseholdError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        HouseholdError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn member_taken(member: &str, household: &str) -> Self {
        HouseholdError::Conflict {
            message: format!("'{}' is already a member of household '{}'", member, household),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            HouseholdError::IoError(_) | HouseholdError::SerializationError(_) => {
                ErrorCategory::Storage
            }
            HouseholdError::ConfigError { .. }
            | HouseholdError::ConfigValidationError { .. }
            | HouseholdError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            HouseholdError::ValidationError { .. } | HouseholdError::InvalidLeaderboard { .. } => {
                ErrorCategory::Input
            }
            HouseholdError::NotFound { .. } => ErrorCategory::NotFound,
            HouseholdError::Conflict { .. } => ErrorCategory::Conflict,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Conflict => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HouseholdError::IoError(e) => format!("Could not read or write household data ({})", e),
            HouseholdError::SerializationError(_) => {
                "Stored household data is corrupted or has an unexpected format".to_string()
            }
            HouseholdError::NotFound { entity, id } => {
                format!("{} '{}' doesn't exist, or it was deleted", entity, id)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the configuration file and command line flags",
            ErrorCategory::Input => "Fix the highlighted field and try again",
            ErrorCategory::Storage => "Check that the data directory exists and is writable",
            ErrorCategory::NotFound => "List the existing records to find a valid id",
            ErrorCategory::Conflict => {
                "Pick another household name, or a member who has no household yet"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, HouseholdError>;
