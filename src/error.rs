use std::fmt;

#[derive(Debug)]
pub enum PsxVerbError {
    Config(ConfigError),
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidJson { message: String },
    GainOutOfRange { field: &'static str, value: f32 },
}

impl fmt::Display for PsxVerbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PsxVerbError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for PsxVerbError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidJson { message } => write!(f, "Invalid config JSON: {message}"),
            ConfigError::GainOutOfRange { field, value } => {
                write!(f, "Gain '{field}' out of range: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for PsxVerbError {
    fn from(e: ConfigError) -> Self {
        PsxVerbError::Config(e)
    }
}
