//! Headless Annotator
//!
//! Applies a session file (text edits, text blocks, drawings, pagination)
//! to a PDF and writes the edited copy next to it.
//!
//! Usage:
//!   cargo run --example annotate -- <input.pdf> [session.json] [output.pdf]
//!
//! Examples:
//!   cargo run --example annotate -- report.pdf
//!   RUST_LOG=editor=debug cargo run --example annotate -- report.pdf edits.json
//!
//! Without a session file the document is only paginated.

use anyhow::{bail, Context};
use editor::{Action, Session};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.pdf> [session.json] [output.pdf]", args[0]);
        std::process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    let pdf_bytes = std::fs::read(input_path)
        .with_context(|| format!("Failed to read PDF '{}'", input_path.display()))?;

    let session = match args.get(2) {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read session '{path}'"))?;
            Session::from_json(&json)?
        }
        None => Session {
            actions: vec![Action::SetPaginationEnabled { enabled: true }],
            ..Session::default()
        },
    };

    let Some(file_name) = input_path.file_name().and_then(|name| name.to_str()) else {
        bail!("Input path has no file name");
    };
    let compiled = session.run(&pdf_bytes, file_name).await?;

    let output_path = match args.get(3) {
        Some(path) => Path::new(path).to_path_buf(),
        None => input_path.with_file_name(&compiled.file_name),
    };
    std::fs::write(&output_path, &compiled.bytes)
        .with_context(|| format!("Failed to write '{}'", output_path.display()))?;

    info!(edits = compiled.edit_count, "done");
    println!("Generated: {}", output_path.display());

    Ok(())
}
