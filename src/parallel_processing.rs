// Per-source generation and the bounded parallel run over all discovered sources.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::exercise::build_exercises;
use crate::incremental::{
    exercise_outputs_exist, generate_exercise_path, generate_exercise_paths, mirrored_out_dir, source_name,
};
use crate::manifest::ExerciseRecord;
use crate::reader::{ReaderConfig, SourceReader};
use crate::render::render_exercise;

/// Processing status of one source
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Skipped,
    Failed,
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    /// Source path as discovered
    pub path: String,
    /// Words in the extracted text
    pub words: usize,
    /// Blank count per variant, in variant order
    pub blanks_per_variant: Vec<usize>,
    /// Exercise files written
    pub outputs: Vec<String>,
    pub processing_time_ms: u64,
    pub status: FileStatus,
    /// Error message if processing failed
    pub error: Option<String>,
}

impl FileStats {
    fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.display().to_string(),
            words: 0,
            blanks_per_variant: Vec::new(),
            outputs: Vec::new(),
            processing_time_ms: 0,
            status,
            error: None,
        }
    }

    fn failed(path: &Path, error: &anyhow::Error, processing_time_ms: u64) -> Self {
        Self {
            processing_time_ms,
            error: Some(format!("{error:#}")),
            ..Self::new(path, FileStatus::Failed)
        }
    }
}

/// Aggregate statistics of one run
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    /// Unix seconds
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub exercises_written: usize,
    pub total_words: usize,
    pub total_blanks: usize,
    /// Sorted by path
    pub file_stats: Vec<FileStats>,
}

impl RunStats {
    fn from_file_stats(run_start: u64, total_processing_time_ms: u64, mut file_stats: Vec<FileStats>) -> Self {
        file_stats.sort_by(|a, b| a.path.cmp(&b.path));

        let count = |status| file_stats.iter().filter(|s| s.status == status).count();
        Self {
            run_start,
            total_processing_time_ms,
            files_processed: count(FileStatus::Success),
            files_skipped: count(FileStatus::Skipped),
            files_failed: count(FileStatus::Failed),
            exercises_written: file_stats.iter().map(|s| s.outputs.len()).sum(),
            total_words: file_stats.iter().map(|s| s.words).sum(),
            total_blanks: file_stats.iter().flat_map(|s| &s.blanks_per_variant).sum(),
            file_stats,
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write stats to {}", path.display()))
    }
}

/// Result of processing one source
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub stats: FileStats,
    /// Catalogue records of the pages written
    pub records: Vec<ExerciseRecord>,
}

/// Seconds since the Unix epoch, 0 if the clock is before it
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Write one rendered page through a buffered async writer
pub async fn write_exercise_file(path: &Path, html: &str) -> Result<()> {
    let file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writer.write_all(html.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Catalogue url of an output: relative to the output root, `/`-separated,
/// or the bare file name when the output lies outside it
fn catalogue_url(output: &Path, config: &GenerationConfig) -> String {
    let root = config.out_dir.as_deref().or(config.source_root.as_deref());

    match root.and_then(|root| output.strip_prefix(root).ok()) {
        Some(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        None => output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Generate every variant of one lesson source
///
/// All pages are rendered in memory before the first one is written, so a
/// source that fails to read or generate leaves no output behind.
pub async fn process_source(source_path: &Path, config: &GenerationConfig) -> Result<SourceOutcome> {
    let start_time = Instant::now();
    let target_dir = mirrored_out_dir(source_path, config.out_dir.as_deref(), config.source_root.as_deref());
    let out_dir = target_dir.as_deref();

    if config.skip_existing && exercise_outputs_exist(source_path, &config.variants, out_dir) {
        debug!("All exercises exist for {}, skipping", source_path.display());
        return Ok(SourceOutcome {
            stats: FileStats::new(source_path, FileStatus::Skipped),
            records: Vec::new(),
        });
    }

    let reader = SourceReader::new(ReaderConfig::default());
    let (markup, _read_stats) = reader.read_source(source_path).await?;

    let name = source_name(source_path);
    let exercises = build_exercises(&markup, &name, &config.variants)
        .with_context(|| format!("Failed to generate exercises for {}", source_path.display()))?;

    let created_at = unix_now();
    let mut pages: Vec<(PathBuf, String)> = Vec::with_capacity(exercises.len());
    let mut records = Vec::with_capacity(exercises.len());

    for doc in &exercises {
        let path = generate_exercise_path(source_path, &doc.variant, out_dir);
        let url = catalogue_url(&path, config);
        let difficulty = config.variants.difficulty_of(&doc.variant);

        records.push(ExerciseRecord::from_document(doc, difficulty, &url, created_at));
        pages.push((path, render_exercise(doc, &config.render)));
    }

    if let Some(dir) = out_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let mut outputs = Vec::with_capacity(pages.len());
    for (path, html) in &pages {
        write_exercise_file(path, html).await?;
        debug!("Wrote {}", path.display());
        outputs.push(path.display().to_string());
    }

    let stats = FileStats {
        path: source_path.display().to_string(),
        words: exercises.first().map(|doc| doc.word_count).unwrap_or(0),
        blanks_per_variant: exercises.iter().map(|doc| doc.answers().len()).collect(),
        outputs,
        processing_time_ms: start_time.elapsed().as_millis() as u64,
        status: FileStatus::Success,
        error: None,
    };

    info!(
        "Generated {} exercises for {} ({} words, blanks {:?})",
        stats.outputs.len(),
        stats.path,
        stats.words,
        stats.blanks_per_variant
    );

    Ok(SourceOutcome { stats, records })
}

/// Sources whose outputs would overwrite those of an earlier source
///
/// Maps each clashing source to the source that keeps the outputs. The first
/// source in input order wins.
pub fn find_output_collisions(files: &[PathBuf], config: &GenerationConfig) -> HashMap<PathBuf, PathBuf> {
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
    let mut collisions = HashMap::new();

    for source in files {
        let target_dir = mirrored_out_dir(source, config.out_dir.as_deref(), config.source_root.as_deref());
        let outputs = generate_exercise_paths(source, &config.variants, target_dir.as_deref());

        if let Some(owner) = outputs.iter().find_map(|output| claimed.get(output)) {
            collisions.insert(source.clone(), (*owner).clone());
            continue;
        }
        for output in outputs {
            claimed.insert(output, source);
        }
    }

    collisions
}

fn collision_error(source: &Path, owner: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Output collision: {} would overwrite the exercises of {}",
        source.display(),
        owner.display()
    )
}

/// Process sources with bounded concurrency
///
/// A failing source is recorded in the stats and the run continues, unless
/// `fail_fast` is set, in which case the first failure aborts the run.
/// Sources whose outputs clash with an earlier source fail without writing.
pub async fn process_files_parallel(
    files: &[PathBuf],
    config: &GenerationConfig,
    fail_fast: bool,
    concurrency: usize,
    progress: Option<&ProgressBar>,
) -> Result<(RunStats, Vec<ExerciseRecord>)> {
    let run_start = unix_now();
    let start_time = Instant::now();

    info!("Processing {} sources with concurrency {}", files.len(), concurrency);

    let collisions = find_output_collisions(files, config);
    if fail_fast {
        if let Some((source, owner)) = files
            .iter()
            .find_map(|source| collisions.get(source).map(|owner| (source, owner)))
        {
            return Err(collision_error(source, owner));
        }
    }
    let collisions = &collisions;

    let mut results = stream::iter(files.iter().map(|path| async move {
        let file_start = Instant::now();
        let result = match collisions.get(path) {
            Some(owner) => Err(collision_error(path, owner)),
            None => process_source(path, config).await,
        };
        (path, result, file_start.elapsed().as_millis() as u64)
    }))
    .buffer_unordered(concurrency.max(1));

    let mut file_stats = Vec::with_capacity(files.len());
    let mut records = Vec::new();

    while let Some((path, result, elapsed_ms)) = results.next().await {
        match result {
            Ok(outcome) => {
                file_stats.push(outcome.stats);
                records.extend(outcome.records);
            }
            Err(e) => {
                if fail_fast {
                    return Err(e.context(format!("Processing failed for {}", path.display())));
                }
                warn!("Failed to process {}: {:#}", path.display(), e);
                file_stats.push(FileStats::failed(path, &e, elapsed_ms));
            }
        }

        if let Some(bar) = progress {
            bar.inc(1);
        }
    }

    let stats = RunStats::from_file_stats(run_start, start_time.elapsed().as_millis() as u64, file_stats);

    info!(
        "Run complete: {} processed, {} skipped, {} failed, {} exercises written",
        stats.files_processed, stats.files_skipped, stats.files_failed, stats.exercises_written
    );

    Ok((stats, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VariantSet;
    use crate::render::extract_blanks;
    use tempfile::TempDir;

    const LESSON: &str = "<p>Een twee drie vier vijf zes zeven acht negen tien elf twaalf.</p>";

    #[tokio::test]
    async fn test_process_source_writes_all_variants() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("les1.html");
        tokio::fs::write(&source, LESSON).await.unwrap();

        let outcome = process_source(&source, &GenerationConfig::default()).await.unwrap();

        assert_eq!(outcome.stats.status, FileStatus::Success);
        assert_eq!(outcome.stats.words, 12);
        assert_eq!(outcome.stats.blanks_per_variant, vec![2, 2, 1]);
        assert_eq!(outcome.stats.outputs.len(), 3);
        assert_eq!(outcome.records.len(), 3);

        let page = tokio::fs::read_to_string(temp_dir.path().join("les1_exercise_every_6th.html"))
            .await
            .unwrap();
        let answers: Vec<String> = extract_blanks(&page).into_iter().map(|b| b.answer).collect();
        assert_eq!(answers, vec!["zes", "twaalf"]);
    }

    #[tokio::test]
    async fn test_process_source_out_dir() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("les2.html");
        tokio::fs::write(&source, LESSON).await.unwrap();

        let config = GenerationConfig {
            out_dir: Some(temp_dir.path().join("out/nested")),
            ..Default::default()
        };
        process_source(&source, &config).await.unwrap();

        assert!(temp_dir.path().join("out/nested/les2_exercise_every_5th.html").exists());
        assert!(!temp_dir.path().join("les2_exercise_every_5th.html").exists());
    }

    #[tokio::test]
    async fn test_skip_existing() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("les3.html");
        tokio::fs::write(&source, LESSON).await.unwrap();

        let config = GenerationConfig { skip_existing: true, ..Default::default() };
        let first = process_source(&source, &config).await.unwrap();
        assert_eq!(first.stats.status, FileStatus::Success);

        let second = process_source(&source, &config).await.unwrap();
        assert_eq!(second.stats.status, FileStatus::Skipped);
        assert!(second.records.is_empty());
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("les4.html");
        tokio::fs::write(&source, LESSON).await.unwrap();
        let output = temp_dir.path().join("les4_exercise_every_7th.html");

        process_source(&source, &GenerationConfig::default()).await.unwrap();
        let first = tokio::fs::read(&output).await.unwrap();
        process_source(&source, &GenerationConfig::default()).await.unwrap();
        let second = tokio::fs::read(&output).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("les1.html");
        let bad = temp_dir.path().join("les2.html");
        tokio::fs::write(&good, LESSON).await.unwrap();
        tokio::fs::write(&bad, [0xFFu8, 0xFE, 0x00]).await.unwrap();

        let files = vec![bad.clone(), good.clone()];
        let (stats, records) = process_files_parallel(&files, &GenerationConfig::default(), false, 2, None)
            .await
            .unwrap();

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.exercises_written, 3);
        assert_eq!(records.len(), 3);

        let failed = &stats.file_stats[1];
        assert_eq!(failed.status, FileStatus::Failed);
        assert!(failed.error.as_deref().unwrap().contains("les2.html"));
        assert!(!temp_dir.path().join("les2_exercise_every_5th.html").exists());
    }

    #[tokio::test]
    async fn test_fail_fast_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("les9.html");

        let result = process_files_parallel(&[missing], &GenerationConfig::default(), true, 1, None).await;
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("les9.html"));
    }

    #[tokio::test]
    async fn test_run_totals() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = Vec::new();
        for n in 1..=4 {
            let path = temp_dir.path().join(format!("les{n}.html"));
            tokio::fs::write(&path, LESSON).await.unwrap();
            files.push(path);
        }

        let config = GenerationConfig {
            variants: VariantSet::from_every_nth(&[3]).unwrap(),
            ..Default::default()
        };
        let (stats, _) = process_files_parallel(&files, &config, false, 3, None).await.unwrap();

        assert_eq!(stats.files_processed, 4);
        assert_eq!(stats.total_words, 48);
        assert_eq!(stats.total_blanks, 16);
        assert_eq!(stats.exercises_written, 4);

        let paths: Vec<&String> = stats.file_stats.iter().map(|s| &s.path).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[tokio::test]
    async fn test_same_stem_sources_mirror_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("lessons");
        let out = temp_dir.path().join("out");
        let a = root.join("a/les1.html");
        let b = root.join("b/les1.html");
        for (path, text) in [(&a, LESSON), (&b, "<p>Andere les met andere woorden erin.</p>")] {
            tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            tokio::fs::write(path, text).await.unwrap();
        }

        let config = GenerationConfig {
            out_dir: Some(out.clone()),
            source_root: Some(root.clone()),
            ..Default::default()
        };
        let (stats, records) = process_files_parallel(&[a, b], &config, false, 2, None).await.unwrap();

        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.files_failed, 0);
        assert_eq!(stats.exercises_written, 6);
        assert_eq!(records.len(), 6);

        let ids: std::collections::HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 6);
        assert!(records.iter().any(|r| r.url == "a/les1_exercise_every_5th.html"));
        assert!(records.iter().any(|r| r.url == "b/les1_exercise_every_5th.html"));

        let page_a = tokio::fs::read_to_string(out.join("a/les1_exercise_every_5th.html")).await.unwrap();
        let page_b = tokio::fs::read_to_string(out.join("b/les1_exercise_every_5th.html")).await.unwrap();
        assert!(page_a.contains("Een twee"));
        assert!(page_b.contains("Andere les"));
    }

    #[tokio::test]
    async fn test_colliding_outputs_fail_the_later_source() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let a = temp_dir.path().join("a/les1.html");
        let b = temp_dir.path().join("b/les1.html");
        for path in [&a, &b] {
            tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            tokio::fs::write(path, LESSON).await.unwrap();
        }

        // No source root: both sources flatten into the same output directory
        let config = GenerationConfig { out_dir: Some(out.clone()), ..Default::default() };
        let files = vec![a.clone(), b.clone()];

        let collisions = find_output_collisions(&files, &config);
        assert_eq!(collisions.get(&b), Some(&a));
        assert!(!collisions.contains_key(&a));

        let (stats, records) = process_files_parallel(&files, &config, false, 2, None).await.unwrap();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.exercises_written, 3);

        let ids: std::collections::HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), records.len());

        let failed = stats.file_stats.iter().find(|s| s.status == FileStatus::Failed).unwrap();
        let error = failed.error.as_deref().unwrap();
        assert!(error.contains("Output collision"));
        assert!(error.contains(&a.display().to_string()));
    }

    #[tokio::test]
    async fn test_collision_with_fail_fast_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let a = temp_dir.path().join("a/les1.html");
        let b = temp_dir.path().join("b/les1.html");
        for path in [&a, &b] {
            tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            tokio::fs::write(path, LESSON).await.unwrap();
        }

        let config = GenerationConfig { out_dir: Some(out.clone()), ..Default::default() };
        let result = process_files_parallel(&[a, b], &config, true, 2, None).await;

        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_stats_json_shape() {
        let stats = RunStats::from_file_stats(1, 2, vec![FileStats::new(Path::new("les1.html"), FileStatus::Skipped)]);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["files_skipped"], 1);
        assert_eq!(json["file_stats"][0]["status"], "skipped");
        assert!(json["file_stats"][0]["error"].is_null());
    }
}
