//! Error types for the document engine.
//!
//! Three layers:
//! - [`EncodingError`] is what the symbology encoder reports for a payload it cannot draw.
//! - [`Error`] is the crate-wide error used by the canvas, the composers and intake.
//! - [`DocumentGenerationError`] is the only error the pipeline returns. It records which
//!   input record was being processed and how many bytes already reached the sink, so the
//!   transport boundary knows whether a clean error response is still possible.

use crate::writer::barcode::SymbolKind;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A payload the symbology encoder cannot represent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// Payload exceeds the capacity of the symbology
    #[error("{kind} payload too large: {len} bytes exceed the symbol capacity")]
    PayloadTooLarge {
        /// Symbology that rejected the payload
        kind: SymbolKind,
        /// Payload length in bytes
        len: usize,
    },

    /// Character outside the symbology's character set
    #[error("unsupported character {ch:?} at position {position}")]
    UnsupportedCharacter {
        /// The offending character
        ch: char,
        /// Character index within the payload
        position: usize,
    },

    /// Nothing to encode
    #[error("{kind} payload is empty")]
    EmptyPayload {
        /// Symbology that rejected the payload
        kind: SymbolKind,
    },
}

/// Error types that can occur while generating a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Symbol encoding failed
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Draw call after the canvas was finalized
    #[error("Canvas is closed: no drawing is possible after finalize")]
    CanvasClosed,

    /// Raster could not be embedded
    #[error("Image error: {0}")]
    Image(String),

    /// Font resource could not be loaded or used
    #[error("Font error: {0}")]
    Font(String),

    /// IO error (includes failures of the output sink)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request body is not valid JSON for the selected document kind
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record failed normalization
    #[error("Invalid record {index}: {reason}")]
    InvalidRecord {
        /// Position of the record in the request
        index: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Caller cancelled the render
    #[error("Document generation cancelled")]
    Cancelled,

    /// Render ran past its deadline
    #[error("Document generation exceeded its deadline")]
    DeadlineExceeded,
}

impl From<crate::writer::image_handler::ImageError> for Error {
    fn from(err: crate::writer::image_handler::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

/// Failure of a whole document render.
///
/// `bytes_emitted == 0` means the sink was never written to. Anything else means the
/// document was partially streamed and the transfer has to be aborted by the caller.
#[derive(Debug, thiserror::Error)]
#[error("document generation failed{}: {source}", record_suffix(.record))]
pub struct DocumentGenerationError {
    /// Index of the offending input record, when attributable
    pub record: Option<usize>,
    /// Bytes already written to the sink when the failure happened
    pub bytes_emitted: u64,
    /// Underlying cause
    #[source]
    pub source: Error,
}

fn record_suffix(record: &Option<usize>) -> String {
    match record {
        Some(index) => format!(" at record {}", index),
        None => String::new(),
    }
}

impl DocumentGenerationError {
    /// Wrap an error that is not tied to a specific record.
    pub fn new(source: Error, bytes_emitted: u64) -> Self {
        Self {
            record: None,
            bytes_emitted,
            source,
        }
    }

    /// Attach the index of the record being processed.
    pub fn at_record(mut self, index: usize) -> Self {
        self.record = Some(index);
        self
    }

    /// True when nothing reached the sink, so a structured error response is still possible.
    pub fn is_clean(&self) -> bool {
        self.bytes_emitted == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_character_message() {
        let err = EncodingError::UnsupportedCharacter {
            ch: 'é',
            position: 3,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("'é'"));
        assert!(msg.contains("position 3"));
    }

    #[test]
    fn test_payload_too_large_message() {
        let err = EncodingError::PayloadTooLarge {
            kind: SymbolKind::MatrixCode,
            len: 9000,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("9000"));
        assert!(msg.contains("QR"));
    }

    #[test]
    fn test_encoding_error_converts() {
        let err: Error = EncodingError::EmptyPayload {
            kind: SymbolKind::LinearCode,
        }
        .into();
        assert!(matches!(err, Error::Encoding(EncodingError::EmptyPayload { .. })));
        assert!(format!("{}", err).starts_with("Encoding error"));
    }

    #[test]
    fn test_invalid_record_message() {
        let err = Error::InvalidRecord {
            index: 4,
            reason: "qty is not a number".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("4"));
        assert!(msg.contains("qty is not a number"));
    }

    #[test]
    fn test_generation_error_with_record() {
        let err = DocumentGenerationError::new(Error::Cancelled, 0).at_record(2);
        assert_eq!(err.record, Some(2));
        assert!(err.is_clean());
        let msg = format!("{}", err);
        assert!(msg.contains("at record 2"));
        assert!(msg.contains("cancelled"));
    }

    #[test]
    fn test_generation_error_after_streaming() {
        let err = DocumentGenerationError::new(Error::DeadlineExceeded, 1024);
        assert!(!err.is_clean());
        assert!(!format!("{}", err).contains("at record"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer closed");
        let err: Error = io_err.into();
        assert!(format!("{}", err).contains("peer closed"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<DocumentGenerationError>();
    }
}
