use std::fmt;

#[derive(Debug)]
pub enum RecoError {
    Network(reqwest::Error),
    Status { url: String, status: u16 },
    Json(serde_json::Error),
    InvalidPayload(String),
    Cache(String),
    Io(std::io::Error),
}

impl RecoError {
    /// True for failures of the transport itself, where a cached copy may stand in.
    pub fn is_network(&self) -> bool {
        matches!(self, RecoError::Network(_) | RecoError::Status { .. })
    }
}

impl fmt::Display for RecoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoError::Network(e) => write!(f, "Network error: {}", e),
            RecoError::Status { url, status } => {
                write!(f, "Request to {} failed with status {}", url, status)
            }
            RecoError::Json(e) => write!(f, "JSON parsing error: {}", e),
            RecoError::InvalidPayload(e) => write!(f, "Invalid payload: {}", e),
            RecoError::Cache(e) => write!(f, "Cache error: {}", e),
            RecoError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for RecoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecoError::Network(e) => Some(e),
            RecoError::Json(e) => Some(e),
            RecoError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RecoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RecoError::InvalidPayload(err.to_string())
        } else {
            RecoError::Network(err)
        }
    }
}

impl From<serde_json::Error> for RecoError {
    fn from(err: serde_json::Error) -> Self {
        RecoError::Json(err)
    }
}

impl From<std::io::Error> for RecoError {
    fn from(err: std::io::Error) -> Self {
        RecoError::Io(err)
    }
}
