//! Error types for brokerkit.

use thiserror::Error;

use crate::TimeframeParseError;

/// Result type alias for brokerkit operations.
pub type Result<T> = std::result::Result<T, BrokerError>;

/// Errors surfaced by the helpers and the core components they compose.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrokerError {
    /// Malformed or unrecognized timeframe text.
    #[error(transparent)]
    InvalidTimeframe(#[from] TimeframeParseError),

    /// A raw record could not be mapped onto its domain shape.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// The raw client failed to execute the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response carried nothing for the requested symbol.
    #[error("No data returned for {symbol}")]
    NoData {
        /// The symbol that had no data.
        symbol: String,
    },

    /// The response had a different layout than the endpoint produces.
    #[error("Unexpected response layout: {0}")]
    UnexpectedResponse(String),

    /// The call was never issued because the batch was cancelled.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl BrokerError {
    /// Creates a [`BrokerError::NoData`] for the given symbol.
    pub fn no_data(symbol: impl Into<String>) -> Self {
        Self::NoData {
            symbol: symbol.into(),
        }
    }

    /// Returns true for a required field missing from a raw record.
    #[must_use]
    pub const fn is_missing_field(&self) -> bool {
        matches!(
            self,
            Self::Normalize(NormalizeError::MissingRequiredField { .. })
        )
    }

    /// Returns true for a raw value that could not be coerced.
    #[must_use]
    pub const fn is_malformed_field(&self) -> bool {
        matches!(self, Self::Normalize(NormalizeError::MalformedField { .. }))
    }
}

/// Errors raised while mapping a raw record onto a domain record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// A field's raw value could not be coerced to its declared type.
    #[error("Malformed field '{field}': expected {expected}, got {value}")]
    MalformedField {
        /// Source field name.
        field: String,
        /// Declared target type.
        expected: &'static str,
        /// The offending raw value, rendered as JSON.
        value: String,
    },

    /// A required field was absent or null.
    #[error("Missing required field '{field}'")]
    MissingRequiredField {
        /// Source field name.
        field: String,
    },

    /// The raw item (or a nested slot) was not a JSON object.
    #[error("Expected a JSON object for {shape}, got {value}")]
    NotAnObject {
        /// Target shape name.
        shape: &'static str,
        /// The offending raw value, rendered as JSON.
        value: String,
    },
}

impl NormalizeError {
    /// Creates a [`NormalizeError::MissingRequiredField`].
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    /// Creates a [`NormalizeError::MalformedField`].
    pub fn malformed(
        field: impl Into<String>,
        expected: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        Self::MalformedField {
            field: field.into(),
            expected,
            value: value.to_string(),
        }
    }

    /// Returns the source field name, if the error concerns one field.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MalformedField { field, .. } | Self::MissingRequiredField { field } => {
                Some(field)
            }
            Self::NotAnObject { .. } => None,
        }
    }
}

/// Error reported by the raw client collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Transport error: {message}")]
pub struct TransportError {
    message: String,
    status: Option<u16>,
}

impl TransportError {
    /// Creates a transport error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Attaches the upstream HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the upstream HTTP status, when known.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }
}

/// Marker error for batch entries skipped after cancellation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("Cancelled before the call was issued")]
pub struct Cancelled;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_renders_value() {
        let err = NormalizeError::malformed("bp", "float", &json!("abc"));
        assert_eq!(
            err.to_string(),
            "Malformed field 'bp': expected float, got \"abc\""
        );
        assert_eq!(err.field(), Some("bp"));
    }

    #[test]
    fn test_classification() {
        let missing: BrokerError = NormalizeError::missing("t").into();
        assert!(missing.is_missing_field());
        assert!(!missing.is_malformed_field());

        let malformed: BrokerError = NormalizeError::malformed("o", "float", &json!([])).into();
        assert!(malformed.is_malformed_field());
    }

    #[test]
    fn test_transport_status() {
        let err = TransportError::new("gateway timeout").with_status(504);
        assert_eq!(err.status(), Some(504));
        assert_eq!(BrokerError::from(err).to_string(), "Transport error: gateway timeout");
    }
}
