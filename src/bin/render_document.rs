//! Render a warehouse document from a JSON request body.
//!
//! Reads the endpoint-shaped body (stdin by default) and writes the PDF
//! (stdout by default).
//!
//! Usage:
//!   render_document --inbound --input items.json --output receipt.pdf
//!   render_document --outbound --strict --timeout-ms 2000 < cart.json > order.pdf
//!
//! Environment overrides (`WMS_DOCGEN_*`) apply first, flags win.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use wms_docgen::{DocumentEngine, DocumentGenerationError, DocumentKind, EngineConfig, PaginationPolicy};

const USAGE: &str = "usage: render_document (--inbound|--outbound) [--input FILE] [--output FILE] \
                     [--strict] [--timeout-ms N] [--font FILE]";

struct CliArgs {
    kind: DocumentKind,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: EngineConfig,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut kind = None;
        let mut input = None;
        let mut output = None;
        let mut config = EngineConfig::from_env();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--inbound" => kind = Some(DocumentKind::Inbound),
                "--outbound" => kind = Some(DocumentKind::Outbound),
                "--strict" => config.pagination = PaginationPolicy::Strict,
                "--input" | "-i" => input = Some(PathBuf::from(value(args, &mut i)?)),
                "--output" | "-o" => output = Some(PathBuf::from(value(args, &mut i)?)),
                "--font" => config.font_path = Some(PathBuf::from(value(args, &mut i)?)),
                "--timeout-ms" => {
                    let raw = value(args, &mut i)?;
                    let ms = raw
                        .parse::<u64>()
                        .map_err(|_| format!("--timeout-ms expects milliseconds, got {:?}", raw))?;
                    config.timeout = Some(Duration::from_millis(ms));
                },
                "--help" | "-h" => return Err(USAGE.to_string()),
                other => return Err(format!("unknown argument {:?}\n{}", other, USAGE)),
            }
            i += 1;
        }

        let kind = kind.ok_or_else(|| format!("one of --inbound or --outbound is required\n{}", USAGE))?;
        Ok(Self {
            kind,
            input,
            output,
            config,
        })
    }
}

fn value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} expects a value", flag))
}

fn read_body(input: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match input {
        Some(path) => fs::read(path),
        None => {
            let mut body = Vec::new();
            io::stdin().lock().read_to_end(&mut body)?;
            Ok(body)
        },
    }
}

fn report(err: &DocumentGenerationError) {
    let structured = serde_json::json!({
        "error": err.source.to_string(),
        "record": err.record,
        "bytesEmitted": err.bytes_emitted,
    });
    eprintln!("{}", structured);
}

fn run(cli: CliArgs) -> Result<(), ExitCode> {
    let body = read_body(cli.input.as_ref()).map_err(|e| {
        eprintln!("Error reading request body: {}", e);
        ExitCode::from(2)
    })?;

    let engine = DocumentEngine::new(cli.config).map_err(|e| {
        eprintln!("Error loading font: {}", e);
        ExitCode::from(2)
    })?;

    let result = match &cli.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                eprintln!("Error creating {}: {}", path.display(), e);
                ExitCode::from(2)
            })?;
            let mut sink = BufWriter::new(file);
            let result = engine
                .generate_json(cli.kind, &body, &mut sink)
                .and_then(|doc| {
                    sink.flush()
                        .map_err(|e| DocumentGenerationError::new(e.into(), doc.byte_len))?;
                    Ok(doc)
                });
            if result.is_err() {
                drop(sink);
                let _ = fs::remove_file(path);
            }
            result
        },
        None => {
            let stdout = io::stdout();
            let mut sink = BufWriter::new(stdout.lock());
            engine.generate_json(cli.kind, &body, &mut sink).and_then(|doc| {
                sink.flush()
                    .map_err(|e| DocumentGenerationError::new(e.into(), doc.byte_len))?;
                Ok(doc)
            })
        },
    };

    match result {
        Ok(doc) => {
            log::info!(
                "Wrote {} ({} pages, {} bytes)",
                cli.output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| cli.kind.file_name().to_string()),
                doc.page_count(),
                doc.byte_len
            );
            Ok(())
        },
        Err(e) => {
            report(&e);
            Err(ExitCode::FAILURE)
        },
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(2);
        },
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}
