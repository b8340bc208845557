//! End-to-end tests for the document pipeline and the `render_document` binary.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::process::Command;
use std::time::Duration;

use tempfile::tempdir;
use wms_docgen::{
    CancelHandle, CartLine, DocumentEngine, DocumentKind, DocumentRequest, EncodingError, EngineConfig, Error,
    LineItem, SymbolKind, TotalWeight,
};

fn engine() -> DocumentEngine {
    DocumentEngine::new(EngineConfig::default()).unwrap()
}

fn inbound(ids: &[&str]) -> DocumentRequest {
    DocumentRequest::Inbound {
        items: ids
            .iter()
            .map(|id| LineItem {
                id: id.to_string(),
                name: format!("Item {}", id),
                quantity: 2.0,
                unit_weight: 1.5,
            })
            .collect(),
    }
}

mod generation_tests {
    use super::*;

    #[test]
    fn test_inbound_end_to_end() {
        let (doc, pdf) = engine().generate_to_vec(&inbound(&["P1", "P2"])).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(pdf.len() as u64, doc.byte_len);
        assert!(pdf.starts_with(b"%PDF-1.7"));
        assert!(pdf.ends_with(b"%%EOF"));

        let header = doc.pages[0]
            .texts()
            .find(|t| t.starts_with("Document No: "))
            .unwrap();
        assert!(header.starts_with("Document No: WH-INV-"));
    }

    #[test]
    fn test_outbound_end_to_end() {
        let request = DocumentRequest::Outbound {
            cart: vec![CartLine {
                item: LineItem {
                    id: "P1".into(),
                    name: "Widget".into(),
                    quantity: 0.0,
                    unit_weight: 2.5,
                },
                ordered_quantity: 2.0,
            }],
            total_weight: TotalWeight("5.00".into()),
        };
        let mut pdf = Vec::new();
        let doc = engine().generate(&request, &mut pdf).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.pages[0].contains_text("Order ID: ORD-"));
        assert!(doc.pages[0].contains_text("Net total weight: 5.00 kg"));
        assert_eq!(pdf.len() as u64, doc.byte_len);
    }

    #[test]
    fn test_uncompressed_output_is_readable() {
        let engine = DocumentEngine::new(EngineConfig::default().with_compress(false)).unwrap();
        let (_, pdf) = engine.generate_to_vec(&inbound(&["P1"])).unwrap();
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("(WMS AUTOMATION SYSTEM) Tj"));
        assert!(text.contains("/Subtype /Image"));
    }

    #[test]
    fn test_concurrent_documents_get_distinct_ids() {
        let engine = engine();
        let ids: HashSet<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let (doc, _) = engine.generate_to_vec(&inbound(&["P1"])).unwrap();
                        let id = doc.pages[0]
                            .texts()
                            .find(|t| t.starts_with("Document No: "))
                            .map(str::to_string)
                            .unwrap();
                        id
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_strict_policy_from_config() {
        let items: Vec<String> = (0..25).map(|i| format!("P{}", i)).collect();
        let ids: Vec<&str> = items.iter().map(String::as_str).collect();
        let config = EngineConfig::default().with_pagination(wms_docgen::PaginationPolicy::Strict);
        let engine = DocumentEngine::new(config).unwrap();
        let (doc, _) = engine.generate_to_vec(&inbound(&ids)).unwrap();
        // 20 rows fit on page 1, the rest and the footer go to page 2
        assert!(doc.pages[1].contains_text("Received by"));
        assert!(doc.pages[2].contains_text("PRODUCT LABELS"));
    }
}

mod failure_tests {
    use super::*;

    #[test]
    fn test_encoding_failure_before_any_byte() {
        let mut sink = Vec::new();
        let err = engine()
            .generate(&inbound(&["P1", "P2", "Ω-3"]), &mut sink)
            .unwrap_err();
        assert_eq!(err.record, Some(2));
        assert_eq!(err.bytes_emitted, 0);
        assert!(err.is_clean());
        assert!(matches!(
            err.source,
            Error::Encoding(EncodingError::UnsupportedCharacter { ch: 'Ω', position: 0 })
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_deadline() {
        let engine = DocumentEngine::new(EngineConfig::default().with_timeout(Duration::ZERO)).unwrap();
        let mut sink = Vec::new();
        let err = engine.generate(&inbound(&[]), &mut sink).unwrap_err();
        assert!(matches!(err.source, Error::DeadlineExceeded));
        assert!(sink.is_empty());
    }

    /// Sink that trips the cancel token as soon as the first page arrives.
    struct CancelOnWrite {
        bytes: Vec<u8>,
        cancel: CancelHandle,
    }

    impl Write for CancelOnWrite {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.cancel.cancel();
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cancel_mid_stream_reports_bytes_emitted() {
        let cancel = CancelHandle::new();
        let mut sink = CancelOnWrite {
            bytes: Vec::new(),
            cancel: cancel.clone(),
        };
        let err = engine()
            .generate_cancellable(&inbound(&["P1", "P2"]), &mut sink, &cancel)
            .unwrap_err();

        assert!(matches!(err.source, Error::Cancelled));
        assert_eq!(err.record, Some(0));
        assert!(!err.is_clean());
        assert_eq!(err.bytes_emitted, sink.bytes.len() as u64);
        assert!(sink.bytes.starts_with(b"%PDF"));
        assert!(!sink.bytes.ends_with(b"%%EOF"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_transport_failure() {
        let err = engine().generate(&inbound(&["P1"]), BrokenPipe).unwrap_err();
        assert!(matches!(err.source, Error::Io(_)));
        assert_eq!(err.bytes_emitted, 0);
    }
}

mod json_tests {
    use super::*;

    #[test]
    fn test_inbound_body() {
        let body = br#"{"items":[{"id":"P1","name":"Widget","qty":10,"weight":2.5},{"id":"P2","name":"Gadget","qty":"3","weight":1}]}"#;
        let mut pdf = Vec::new();
        let doc = engine().generate_json(DocumentKind::Inbound, body, &mut pdf).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert!(doc.pages[0].contains_text("Gadget"));
    }

    #[test]
    fn test_outbound_body_with_numeric_total() {
        let body = br#"{"cart":[{"id":"P1","name":"Widget","orderQty":2,"weight":2.5}],"totalWeight":5}"#;
        let mut pdf = Vec::new();
        let doc = engine().generate_json(DocumentKind::Outbound, body, &mut pdf).unwrap();
        assert!(doc.pages[0].contains_text("Net total weight: 5 kg"));
        assert!(doc.pages[0].contains_text("5.00 kg"));
    }

    #[test]
    fn test_missing_items_yield_empty_table() {
        let mut pdf = Vec::new();
        let doc = engine().generate_json(DocumentKind::Inbound, b"{}", &mut pdf).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert!(doc.pages[1].contains_text("PRODUCT LABELS"));
    }

    #[test]
    fn test_missing_id_is_not_fatal() {
        let body = br#"{"items":[{"name":"Widget","qty":1,"weight":1}]}"#;
        let mut pdf = Vec::new();
        let doc = engine().generate_json(DocumentKind::Inbound, body, &mut pdf).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert!(doc.pages[1].contains_text("Product: Widget"));
        assert_eq!(doc.pages[1].symbols(SymbolKind::LinearCode).count(), 0);
        assert!(pdf.ends_with(b"%%EOF"));
    }

    #[test]
    fn test_thai_name_without_embedded_font() {
        let body = r#"{"items":[{"id":"P1","name":"น้ำดื่ม","qty":1,"weight":1}]}"#;
        let engine = DocumentEngine::new(EngineConfig::default().with_compress(false)).unwrap();
        let mut pdf = Vec::new();
        engine.generate_json(DocumentKind::Inbound, body.as_bytes(), &mut pdf).unwrap();
        // Base-14 WinAnsi has no Thai glyphs
        assert!(String::from_utf8_lossy(&pdf).contains("(???????) Tj"));
    }

    #[test]
    fn test_malformed_body() {
        let mut pdf = Vec::new();
        let err = engine()
            .generate_json(DocumentKind::Outbound, b"[1, 2", &mut pdf)
            .unwrap_err();
        assert!(matches!(err.source, Error::Json(_)));
        assert!(err.record.is_none());
        assert!(pdf.is_empty());
    }

    #[test]
    fn test_tagged_request() {
        let json = r#"{"kind":"inbound","items":[{"id":"P1","name":"Widget","qty":1,"weight":1}]}"#;
        let request: DocumentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind(), DocumentKind::Inbound);
        let (doc, _) = engine().generate_to_vec(&request).unwrap();
        assert_eq!(doc.page_count(), 2);
    }
}

mod cli_tests {
    use super::*;

    fn bin() -> Command {
        Command::new(env!("CARGO_BIN_EXE_render_document"))
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("items.json");
        let output = dir.path().join("receipt.pdf");
        fs::write(&input, br#"{"items":[{"id":"P1","name":"Widget","qty":10,"weight":2.5}]}"#).unwrap();

        let status = bin()
            .args(["--inbound", "--input"])
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .status()
            .unwrap();
        assert!(status.success());

        let pdf = fs::read(&output).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.7"));
        assert!(pdf.ends_with(b"%%EOF"));
    }

    #[test]
    fn test_invalid_record_exit_code() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("cart.json");
        let output = dir.path().join("order.pdf");
        fs::write(&input, br#"{"cart":[{"id":"P1","orderQty":0,"weight":1}],"totalWeight":0}"#).unwrap();

        let result = bin()
            .args(["--outbound", "--strict", "--input"])
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .output()
            .unwrap();
        assert!(!result.status.success());
        let stderr = String::from_utf8_lossy(&result.stderr);
        assert!(stderr.contains("\"record\":0"));
        assert!(stderr.contains("\"bytesEmitted\":0"));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_kind_is_usage_error() {
        let result = bin().output().unwrap();
        assert_eq!(result.status.code(), Some(2));
    }
}
