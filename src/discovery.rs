use anyhow::Result;
use futures::stream::{Stream, StreamExt};
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::incremental::is_generated_exercise;

/// File name pattern of lesson sources when nothing else is configured
pub const DEFAULT_SOURCE_PATTERN: &str = "les*.html";

/// Configuration for source discovery
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Whether to fail fast on first error or continue
    pub fail_fast: bool,
    /// Glob pattern for source file names, relative to the root directory
    pub pattern: String,
    /// Also search subdirectories of the root
    pub recursive: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            pattern: DEFAULT_SOURCE_PATTERN.to_string(),
            recursive: false,
        }
    }
}

/// Result of source discovery validation
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub error: Option<String>,
}

impl FileValidation {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Discover lesson sources matching the configured pattern under the root directory.
/// Generated exercise files are never yielded, whatever the pattern.
///
/// # Arguments
/// * `root_dir` - Directory to search
/// * `config` - Pattern, recursion and fail_fast behavior
///
/// # Returns
/// Stream of `FileValidation` results in glob order
pub fn discover_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    let root_path = root_dir.as_ref().to_path_buf();

    futures::stream::unfold(
        DiscoveryState::new(root_path, config),
        |mut state| async move {
            state.next_file().await.map(|result| (result, state))
        }
    )
}

/// Internal state for source discovery iteration
struct DiscoveryState {
    root_dir: PathBuf,
    config: DiscoveryConfig,
    glob_iter: Option<glob::Paths>,
}

impl DiscoveryState {
    fn new(root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            config,
            glob_iter: None,
        }
    }

    fn full_pattern(&self) -> String {
        let root = Pattern::escape(&self.root_dir.to_string_lossy());
        if self.config.recursive {
            format!("{}/**/{}", root, self.config.pattern)
        } else {
            format!("{}/{}", root, self.config.pattern)
        }
    }

    async fn next_file(&mut self) -> Option<Result<FileValidation>> {
        if self.glob_iter.is_none() {
            let pattern = self.full_pattern();
            debug!("Starting source discovery with pattern: {}", pattern);

            match glob(&pattern) {
                Ok(paths) => {
                    self.glob_iter = Some(paths);
                    info!("Source discovery initialized for root: {}", self.root_dir.display());
                }
                Err(e) => {
                    return Some(Err(anyhow::anyhow!("Invalid source pattern {}: {}", self.config.pattern, e)));
                }
            }
        }

        loop {
            let glob_iter = self.glob_iter.as_mut()?;
            match glob_iter.next() {
                Some(Ok(path)) => {
                    if is_generated_exercise(&path) {
                        debug!("Skipping generated exercise: {}", path.display());
                        continue;
                    }
                    debug!("Found source: {}", path.display());
                    match self.validate_file(path).await {
                        Ok(Some(validation)) => return Some(Ok(validation)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(e)),
                    }
                }
                Some(Err(e)) => {
                    let error_msg = format!("Glob iteration error: {e}");
                    warn!("{}", error_msg);

                    if self.config.fail_fast {
                        return Some(Err(anyhow::anyhow!(error_msg)));
                    }
                }
                None => {
                    info!("Source discovery completed");
                    return None;
                }
            }
        }
    }

    /// Directories that match the pattern are skipped; unreadable entries are
    /// reported unless fail_fast turns them into an error.
    async fn validate_file(&self, path: PathBuf) -> Result<Option<FileValidation>> {
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(FileValidation { path, error: None })),
            Ok(_) => {
                debug!("Skipping non-file match: {}", path.display());
                Ok(None)
            }
            Err(e) => {
                let error = format!("Cannot access file {}: {}", path.display(), e);
                warn!("{}", error);

                if self.config.fail_fast {
                    Err(anyhow::anyhow!(error))
                } else {
                    Ok(Some(FileValidation { path, error: Some(error) }))
                }
            }
        }
    }
}

/// Collect all discovered sources, sorted by path
pub async fn collect_discovered_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_files(root_dir, config));

    while let Some(result) = stream.next().await {
        files.push(result?);
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let valid_count = files.iter().filter(|f| f.is_valid()).count();
    let invalid_count = files.len() - valid_count;

    if invalid_count > 0 {
        warn!("Found {} sources with validation issues", invalid_count);
    }

    info!("Source discovery summary: {} valid, {} invalid", valid_count, invalid_count);

    Ok(files)
}

/// Convenience function returning only the valid lesson sources under a root
/// using the default pattern
pub async fn find_lesson_files<P: AsRef<Path>>(root_dir: P) -> Result<Vec<PathBuf>> {
    let validations = collect_discovered_files(root_dir, DiscoveryConfig::default()).await?;

    Ok(validations
        .into_iter()
        .filter(FileValidation::is_valid)
        .map(|v| v.path)
        .collect())
}
