use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, info};

const UTF8_BOM: char = '\u{FEFF}';

/// Configuration for source reading
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { buffer_size: 8192 }
    }
}

/// Statistics for one source read
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub bytes_read: u64,
    pub duration_ms: u64,
}

/// Async reader for lesson sources
pub struct SourceReader {
    config: ReaderConfig,
}

impl SourceReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a whole source as UTF-8 text
    ///
    /// A leading byte order mark is dropped. Invalid UTF-8 is an error naming
    /// the file and the byte offset of the first bad sequence.
    pub async fn read_source<P: AsRef<Path>>(&self, file_path: P) -> Result<(String, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        debug!("Starting async read of source: {}", path.display());

        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open source {}", path.display()))?;

        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .await
            .with_context(|| format!("Failed to read source {}", path.display()))?;

        let bytes_read = bytes.len() as u64;
        let mut content = String::from_utf8(bytes).map_err(|e| {
            anyhow::anyhow!(
                "UTF-8 decoding error in {} at byte {}",
                path.display(),
                e.utf8_error().valid_up_to()
            )
        })?;

        if content.starts_with(UTF8_BOM) {
            content.remove(0);
        }

        let stats = ReadStats {
            file_path: path.display().to_string(),
            bytes_read,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Read {}: {} bytes in {}ms",
            path.display(),
            stats.bytes_read,
            stats.duration_ms
        );

        Ok((content, stats))
    }
}

/// Convenience function for reading a single source with default configuration
pub async fn read_source_async<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let reader = SourceReader::new(ReaderConfig::default());
    let (content, _stats) = reader.read_source(file_path).await?;
    Ok(content)
}
