use thiserror::Error;

/// Error type for the shared models
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid boot location {location}: {source}")]
    InvalidLocation {
        location: String,
        #[source]
        source: url::ParseError,
    },

    #[error("boot location {0} has no host")]
    MissingHost(String),
}

/// Result type for the shared models
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingHost("file:///boot".to_string());
        assert_eq!(err.to_string(), "boot location file:///boot has no host");
    }
}
