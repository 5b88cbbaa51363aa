use {crate::key::CipherKind, thiserror::Error};

/// Invalid or incomplete input detected before any I/O takes place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// All absent fields are reported at once.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("invalid key strength {0} - must be either 1 or 2")]
    InvalidKeyStrength(i64),
    #[error("invalid {field} length for {cipher}: expected {expected} bytes, got {got}")]
    InvalidLength {
        field: &'static str,
        cipher: CipherKind,
        expected: usize,
        got: usize,
    },
    #[error("invalid shared access signature URI: {0}")]
    InvalidSasUri(String),
}

/// Collects names of absent fields while validating a record.
#[derive(Debug, Default)]
pub struct MissingFields(Vec<&'static str>);

impl MissingFields {
    pub fn check<T>(&mut self, name: &'static str, value: Option<&T>) {
        if value.is_none() {
            self.0.push(name);
        }
    }

    pub fn into_error(self) -> ConfigurationError {
        ConfigurationError::MissingFields(self.0)
    }
}
