//! Platform client errors with Arcus error-code matching

use thiserror::Error;

/// Platform error codes this client compares against. The platform owns
/// the taxonomy; these are the codes the console reacts to by name.
pub mod codes {
    pub const ZIP_UNRECOGNIZED: &str = "zip.unrecognized";
    pub const ADDRESS_UNVERIFIED: &str = "address.unverified";
    pub const CARD_DECLINED: &str = "card.declined";
    pub const CARD_INVALID: &str = "card.invalid";
    pub const PIN_NOT_UNIQUE_AT_PLACE: &str = "pin.notUniqueAtPlace";
    pub const PROMON_UNAVAILABLE: &str = "promonitoring.unavailable";
}

/// Errors that can occur when talking to the Arcus platform
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The platform answered with an Error payload (code + message)
    #[error("{code}: {message}")]
    Platform { code: String, message: String },

    /// The underlying WebSocket/HTTP transport failed
    #[error("transport error: {0}")]
    Transport(String),

    /// The session closed while a request was outstanding
    #[error("session closed")]
    SessionClosed,

    /// The platform answered with something this client cannot parse
    #[error("malformed platform response: {0}")]
    Malformed(String),
}

impl ClientError {
    /// Create a platform error for a code/message pair
    pub fn platform(code: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Platform {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport(message.into())
    }

    /// Create a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        ClientError::Malformed(message.into())
    }

    /// Get the platform error code, if this is a platform error
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Platform { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Check whether this is a platform error with the given code
    pub fn is_code(&self, code: &str) -> bool {
        self.code() == Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_code_matches_platform_errors_only() {
        let err = ClientError::platform(codes::ZIP_UNRECOGNIZED, "unknown zipcode");
        assert!(err.is_code(codes::ZIP_UNRECOGNIZED));
        assert!(!err.is_code(codes::PIN_NOT_UNIQUE_AT_PLACE));

        let err = ClientError::transport("connection reset");
        assert!(!err.is_code(codes::ZIP_UNRECOGNIZED));
        assert!(err.code().is_none());
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let err = ClientError::platform(codes::PIN_NOT_UNIQUE_AT_PLACE, "pin already in use");
        assert_eq!(err.to_string(), "pin.notUniqueAtPlace: pin already in use");
    }
}
