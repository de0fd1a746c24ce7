use anyhow::{Context, Result};
use clap::Parser;
use console::{Emoji, style};
use indicatif::HumanBytes;
use std::io::ErrorKind;
use std::path::PathBuf;

use metaforge::TorrentBuilder;
use metaforge::cli::Args;
use metaforge::logging::init_tracing;

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "OK ");

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.effective_log_level().as_tracing_level());

    let force = args.force;
    let dry_run = args.dry_run;
    let progress = args.progress;
    let source = args.source.clone();

    // Determine output file path
    let output_path = args.output.clone().unwrap_or_else(|| {
        let name = args.name.clone().unwrap_or_else(|| {
            source
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("output")
                .to_string()
        });
        PathBuf::from(format!("{}.torrent", name))
    });

    let builder = TorrentBuilder::new(source, args.into_options())
        .with_output_file(output_path.clone())
        .with_progress(progress);

    if dry_run {
        let report = builder.dry_run().context("Dry run failed")?;
        eprintln!("{} {}", CHECK, style("Dry Run Results:").bold().underlined());
        eprintln!("{:<15} {}", style("Name:").bold(), style(&report.name).cyan());
        eprintln!(
            "{:<15} {}",
            style("Total Size:").bold(),
            style(HumanBytes(report.total_size)).green()
        );
        eprintln!("{:<15} {}", style("File Count:").bold(), report.file_count);
        eprintln!(
            "{:<15} {}",
            style("Piece Length:").bold(),
            style(HumanBytes(u64::from(report.piece_length))).yellow()
        );
        eprintln!("{:<15} {}", style("Piece Count:").bold(), report.piece_count);
        return Ok(());
    }

    let metadata = builder.create_file(&output_path, force).map_err(|e| {
        let exists = matches!(
            &e,
            metaforge::Error::Io { source, .. } if source.kind() == ErrorKind::AlreadyExists
        );
        let context = if exists {
            format!("Output file exists (use -f to overwrite): {}", output_path.display())
        } else {
            format!("Failed to create torrent: {}", output_path.display())
        };
        anyhow::Error::new(e).context(context)
    })?;

    let info_hash = metadata
        .info_hash()
        .context("Failed to compute info hash")?;

    println!("Created: {}", output_path.display());
    println!(
        "{:<15} {} in {} pieces of {}",
        style("Content:").bold(),
        HumanBytes(metadata.total_size()),
        metadata.piece_count(),
        HumanBytes(u64::from(metadata.piece_length))
    );
    println!("{:<15} {}", style("Info Hash:").bold(), hex::encode(info_hash));

    Ok(())
}
