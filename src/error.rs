//! Error taxonomy
//!
//! Every façade error is a structured result; handlers convert them to the
//! documented JSON envelope. No operation is fatal to the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlotError {
    /// Request was well-formed but unusable (e.g. missing body on /update)
    #[error("{0}")]
    Validation(String),

    /// Request body was not valid UTF-8
    #[error("Request body is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// A front end could not reach the store (surfaced to the chat user
    /// as a connection error, never retried automatically)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl SlotError {
    /// Whether this is a caller mistake (400-class) rather than ours.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(SlotError::Validation("No data provided".into()).is_client_error());
        assert!(!SlotError::Unavailable("down".into()).is_client_error());

        let bad = std::str::from_utf8(&[0xff, 0xfe]).unwrap_err();
        assert!(SlotError::from(bad).is_client_error());
    }

    #[test]
    fn test_messages_are_stable() {
        let err = SlotError::Validation("No data provided".into());
        assert_eq!(err.to_string(), "No data provided");
    }
}
