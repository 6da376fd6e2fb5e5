use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use refscale_core::export::{export_board, PdfSink};

use super::Workspace;

#[derive(Args)]
pub struct ExportArgs {
    /// Output PDF file
    #[arg(short, long, default_value = "board.pdf")]
    pub output: PathBuf,
}

pub fn run(ws: &Workspace, args: &ExportArgs) -> Result<()> {
    let mut sink = PdfSink::for_board(&ws.board);
    let report = export_board(&ws.board, &mut sink);
    for (id, err) in &report.skipped {
        eprintln!("Skipped {id}: {err}");
    }

    let bytes = sink.finish();
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Exported {} image(s) to {}",
        report.placed.len(),
        args.output.display()
    );
    Ok(())
}
