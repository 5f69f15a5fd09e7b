use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use pvmx_core::extract::{ExtractEvent, extract_archive};
use pvmx_core::write::create_archive;

/// PVMX texture pack archiver.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Create an archive using the given texture pack index
    #[arg(short = 'c', long = "create", value_name = "PATH", conflicts_with = "extract")]
    create: Option<PathBuf>,

    /// Extract an archive
    #[arg(short = 'e', long = "extract", value_name = "PATH")]
    extract: Option<PathBuf>,

    /// Output file for creation or output directory for extraction
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,
}

fn create(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let output_path = create_archive(input, output, |name| {
        println!("Packing file: {name}");
    })
    .context("Failed to create archive")?;

    println!("Output file: {}", output_path.display());
    println!("Done!");

    Ok(())
}

fn extract(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let mut bar: Option<ProgressBar> = None;
    let report = extract_archive(input, output, |event| match event {
        ExtractEvent::Start { total } => {
            let b = ProgressBar::new(total as u64);
            b.set_style(
                ProgressStyle::default_bar()
                    .template("{pos}/{len} files written {wide_bar}")
                    .unwrap(),
            );
            bar = Some(b);
        }
        ExtractEvent::FileStart { name } => {
            if let Some(bar) = &bar {
                bar.println(format!("Extracting: {name}"));
            }
        }
        ExtractEvent::FileDone { .. } => {
            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }
    })
    .context("Failed to extract archive")?;

    if let Some(bar) = &bar {
        bar.finish();
    }
    println!("Output directory: `{}`", report.output_dir.display());
    println!("Done.");

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match (&cli.create, &cli.extract) {
        (Some(input), None) => create(input, cli.output.as_deref()),
        (None, Some(input)) => extract(input, cli.output.as_deref()),
        _ => {
            Cli::command().print_help()?;
            std::process::exit(2);
        }
    }
}
