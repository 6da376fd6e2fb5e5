use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::Workspace;

#[derive(Args)]
pub struct AddArgs {
    /// Image files (PNG, JPEG, ...)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(ws: &mut Workspace, args: &AddArgs) -> Result<()> {
    let pb = ProgressBar::new(args.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Reading [{bar:40}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("=> "),
    );

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        pb.set_message(name.clone());
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        files.push((name, bytes));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let report = ws.board.ingest(files);
    for id in &report.added {
        let img = ws.board.get(*id)?;
        println!(
            "Added {} {} ({}x{})",
            id,
            img.name().unwrap_or(""),
            img.original_width(),
            img.original_height()
        );
    }
    for (name, err) in &report.failed {
        eprintln!("Skipped {name}: {err}");
    }

    ws.save()
}
