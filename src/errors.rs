use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Collection not found: {0}")]
    NoSuchCollection(String),

    #[error("Invalid document ID: {0}")]
    InvalidDocumentId(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DbError {
    /// Shorthand used by the parsers for caller-side input faults.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }

    /// HTTP status a controller should answer with for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            _ => 500,
        }
    }
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
