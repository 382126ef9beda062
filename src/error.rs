use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ConfigError = Error;

/// Prefix carried by every summary cache failure.
pub const FETCH_ERROR_PREFIX: &str = "Failed to retrieve summary data; ";

/// Failures raised by the stores, the summary API and configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            Error::HttpError(_) | Error::Timeout(_) | Error::Io(_)
        )
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_) | Error::Config(_) | Error::Invalid(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::HttpError(_) => "HTTP_ERROR",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Timeout(_) => "TIMEOUT",
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Config(_) => "CONFIG",
            Error::Storage(_) => "STORAGE",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Invalid(_) => "INVALID",
        }
    }
}

/// Required submission field that was blank or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Location,
    Title,
    Content,
    Image,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MissingField::Location => "location",
            MissingField::Title => "title",
            MissingField::Content => "content",
            MissingField::Image => "image",
        };
        f.write_str(name)
    }
}

/// What happened to the uploaded image after a failed document write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Removed,
    Failed(String),
}

impl std::fmt::Display for CleanupOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupOutcome::Removed => f.write_str("image removed"),
            CleanupOutcome::Failed(reason) => write!(f, "image left behind: {}", reason),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("You must insert image, title and content before submit (missing {0})")]
    Validation(MissingField),

    #[error("Failed to upload image to {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: Error,
    },

    #[error("Failed to save news ({cleanup}): {source}")]
    Persist {
        path: String,
        cleanup: CleanupOutcome,
        #[source]
        source: Error,
    },
}

impl SubmitError {
    /// True when the caller should fix the input rather than retry.
    pub fn is_user_error(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SubmitError::Validation(_) => "VALIDATION",
            SubmitError::Upload { .. } => "UPLOAD",
            SubmitError::Persist { .. } => "PERSIST",
        }
    }
}

#[derive(Debug, Error)]
#[error("Failed to delete news {id}: {source}")]
pub struct DeleteError {
    pub id: String,
    #[source]
    pub source: Error,
}

#[derive(Debug, Error)]
#[error("{}{}", FETCH_ERROR_PREFIX, .source)]
pub struct FetchError {
    pub country: String,
    #[source]
    pub source: Error,
}

impl FetchError {
    pub fn new<C: Into<String>>(country: C, source: Error) -> Self {
        Self {
            country: country.into(),
            source,
        }
    }
}
