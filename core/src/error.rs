//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The document is not a usable OpenAPI 3.x contract.
    #[from(ignore)]
    #[display("Contract Error: {_0}")]
    Contract(String),

    /// A `$ref` does not point at anything in the document.
    #[from(ignore)]
    #[display("Unresolved Reference: {_0}")]
    UnresolvedRef(String),

    /// A generator knob was unknown or carried an invalid value.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// The target directory holds files the generator did not write.
    #[from(ignore)]
    #[display("Refused: {_0}")]
    Refused(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        // Test that String defaults to General, not Contract
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_display_prefixes() {
        let err = AppError::UnresolvedRef("#/components/schemas/Missing".into());
        assert_eq!(
            format!("{}", err),
            "Unresolved Reference: #/components/schemas/Missing"
        );
        assert_eq!(
            AppError::Refused("out".into()).to_string(),
            "Refused: out"
        );
    }
}
