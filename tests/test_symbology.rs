//! Integration tests for the symbology encoder.
//!
//! Covers the encoder contract as seen from outside the crate:
//! - byte-identical output for identical input
//! - Code 128 accepts digits and uppercase letters
//! - characters outside Code 128 set B are reported with their position
//! - QR capacity overflow

use proptest::prelude::*;
use wms_docgen::writer::{encode, QrErrorCorrection, SymbolKind, SymbolOptions};
use wms_docgen::EncodingError;

mod determinism_tests {
    use super::*;

    proptest! {
        #[test]
        fn matrix_code_is_deterministic(payload in "\\PC{1,120}") {
            let options = SymbolOptions::default();
            let a = encode(SymbolKind::MatrixCode, &payload, &options).unwrap();
            let b = encode(SymbolKind::MatrixCode, &payload, &options).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn linear_code_is_deterministic(payload in "[A-Za-z0-9 .-]{1,40}", show_text in any::<bool>()) {
            let options = SymbolOptions::default().show_text(show_text);
            let a = encode(SymbolKind::LinearCode, &payload, &options).unwrap();
            let b = encode(SymbolKind::LinearCode, &payload, &options).unwrap();
            prop_assert_eq!(a.pixels, b.pixels);
            prop_assert_eq!(a.pixel_width, b.pixel_width);
        }
    }

    #[test]
    fn test_options_change_output() {
        let low = encode(
            SymbolKind::MatrixCode,
            "WH-INV-20240105101500-0A1B2C3D",
            &SymbolOptions::default().error_correction(QrErrorCorrection::Low),
        )
        .unwrap();
        let high = encode(
            SymbolKind::MatrixCode,
            "WH-INV-20240105101500-0A1B2C3D",
            &SymbolOptions::default().error_correction(QrErrorCorrection::High),
        )
        .unwrap();
        assert_ne!(low.pixels, high.pixels);
    }
}

mod charset_tests {
    use super::*;

    proptest! {
        #[test]
        fn digits_and_uppercase_always_encode(payload in "[0-9A-Z]{1,48}") {
            let symbol = encode(SymbolKind::LinearCode, &payload, &SymbolOptions::default().show_text(true));
            prop_assert!(symbol.is_ok());
            prop_assert_eq!(symbol.unwrap().caption, Some(payload));
        }

        #[test]
        fn unsupported_character_is_located(
            prefix in "[0-9A-Z]{0,12}",
            bad in prop::sample::select(vec!['é', '\n', '\t', '€', '\u{7f}', 'ก', '\u{0}']),
            suffix in "[0-9A-Z]{0,12}",
        ) {
            let payload = format!("{}{}{}", prefix, bad, suffix);
            let err = encode(SymbolKind::LinearCode, &payload, &SymbolOptions::default()).unwrap_err();
            prop_assert_eq!(
                err,
                EncodingError::UnsupportedCharacter { ch: bad, position: prefix.chars().count() }
            );
        }
    }

    #[test]
    fn test_matrix_code_accepts_multiline_unicode() {
        let payload = "ID:P1\nNAME:น้ำดื่ม 600ml\nQTY:45";
        assert!(encode(SymbolKind::MatrixCode, payload, &SymbolOptions::default()).is_ok());
    }

    #[test]
    fn test_matrix_code_capacity() {
        let payload = "X".repeat(5000);
        let err = encode(SymbolKind::MatrixCode, &payload, &SymbolOptions::default()).unwrap_err();
        assert_eq!(
            err,
            EncodingError::PayloadTooLarge {
                kind: SymbolKind::MatrixCode,
                len: 5000
            }
        );
    }
}
