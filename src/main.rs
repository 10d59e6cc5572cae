use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

use clozegen::discovery::{self, DiscoveryConfig, DEFAULT_SOURCE_PATTERN};
use clozegen::manifest::Manifest;
use clozegen::parallel_processing::{process_files_parallel, unix_now};
use clozegen::{GenerationConfig, RenderOptions, VariantSet};

#[derive(Parser, Debug)]
#[command(name = "clozegen")]
#[command(about = "Fill-in-the-blank exercise generator for HTML lesson files")]
#[command(version)]
struct Args {
    /// Root directory to scan for lesson files
    #[arg(default_value = ".")]
    root_dir: PathBuf,

    /// Glob pattern for lesson file names
    #[arg(long, default_value = DEFAULT_SOURCE_PATTERN)]
    pattern: String,

    /// Also scan subdirectories
    #[arg(long)]
    recursive: bool,

    /// Blank densities, one exercise per value
    #[arg(long, value_delimiter = ',', default_value = "5,6,7")]
    every: Vec<usize>,

    /// Write exercises here instead of next to each lesson
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Language attribute of generated pages
    #[arg(long, default_value = "nl")]
    lang: String,

    /// Add a "Back to Exercises" link to this href on every page
    #[arg(long)]
    index_link: Option<String>,

    /// Leave lessons alone whose exercises all exist
    #[arg(long)]
    skip_existing: bool,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Lessons processed at the same time (default: CPU count)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,

    /// Also write an exercise catalogue to this path
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting clozegen");
    info!(?args, "Parsed CLI arguments");

    // Bad densities are rejected before anything is read or written
    let variants = VariantSet::from_every_nth(&args.every)?;

    if !args.root_dir.exists() {
        anyhow::bail!("Root directory does not exist: {}", args.root_dir.display());
    }

    if !args.root_dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", args.root_dir.display());
    }

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
        pattern: args.pattern.clone(),
        recursive: args.recursive,
    };

    info!("Starting lesson discovery in: {}", args.root_dir.display());
    let discovered = discovery::collect_discovered_files(&args.root_dir, discovery_config).await?;

    let (valid, invalid): (Vec<_>, Vec<_>) = discovered.into_iter().partition(|f| f.is_valid());
    for file in &invalid {
        if let Some(ref error) = file.error {
            info!("Issue with {}: {}", file.path.display(), error);
        }
    }

    println!("clozegen v{} - Lesson discovery complete", env!("CARGO_PKG_VERSION"));
    println!("Found {} lessons matching pattern {}", valid.len() + invalid.len(), args.pattern);
    if !invalid.is_empty() {
        println!("Lessons with issues: {}", invalid.len());
    }

    let files: Vec<PathBuf> = valid.into_iter().map(|f| f.path).collect();

    let config = GenerationConfig {
        variants,
        render: RenderOptions {
            lang: args.lang.clone(),
            index_href: args.index_link.clone(),
        },
        out_dir: args.out_dir.clone(),
        source_root: Some(args.root_dir.clone()),
        skip_existing: args.skip_existing,
    };

    let progress = if args.no_progress || files.is_empty() {
        None
    } else {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} lessons [{elapsed_precise}]")?,
        );
        Some(bar)
    };

    let concurrency = args.concurrency.unwrap_or_else(num_cpus::get);
    let (stats, records) =
        process_files_parallel(&files, &config, args.fail_fast, concurrency, progress.as_ref()).await?;

    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    stats.save(&args.stats_out).await?;
    info!("Run stats written to {}", args.stats_out.display());

    if let Some(ref manifest_path) = args.manifest {
        let manifest = Manifest::new(records, unix_now());
        manifest.save(manifest_path).await?;
        println!("Catalogue with {} exercises written to {}", manifest.metadata.total_exercises, manifest_path.display());
    }

    println!("Generation complete:");
    println!("  Lessons processed: {}", stats.files_processed);
    if stats.files_skipped > 0 {
        println!("  Lessons skipped: {}", stats.files_skipped);
    }
    if stats.files_failed > 0 {
        println!("  Lessons failed: {}", stats.files_failed);
        for failed in stats.file_stats.iter().filter(|s| s.error.is_some()) {
            println!("    {}: {}", failed.path, failed.error.as_deref().unwrap_or_default());
        }
    }
    println!("  Exercises written: {}", stats.exercises_written);
    println!("  Blanks created: {}", stats.total_blanks);

    Ok(())
}
