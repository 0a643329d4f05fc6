pub use crate::types::{GuesserError, ResolveError};

pub type Result<T> = std::result::Result<T, GuesserError>;

pub trait ErrorContext<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| GuesserError::ConfigError(format!("{}: {}", f(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_prefixes_message() {
        let parsed: std::result::Result<u16, _> = "port".parse::<u16>();
        let err = parsed.with_context(|| "Invalid port".to_string()).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Invalid port: "));
    }
}
