// Integration test utilities and common code

pub mod fixtures;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Densities produced when nothing else is configured
pub const DEFAULT_DENSITIES: [usize; 3] = [5, 6, 7];

/// Test fixture helper for creating temporary directories with lesson files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Create a lesson file with given content
    pub fn create_lesson_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        self.create_raw_file(relative_path, content.as_bytes())
    }

    /// Create a file with arbitrary bytes, for encoding tests
    pub fn create_raw_file<P: AsRef<Path>>(&self, relative_path: P, content: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Exercise path next to the source, matching the generator's naming
    /// for densities 4 through 20
    pub fn exercise_path<P: AsRef<Path>>(&self, source_path: P, every_nth: usize) -> PathBuf {
        let source_path = source_path.as_ref();
        let stem = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        source_path.with_file_name(format!("{stem}_exercise_every_{every_nth}th.html"))
    }

    /// Check if all default exercises exist for given source file
    pub fn exercises_exist<P: AsRef<Path>>(&self, source_path: P) -> bool {
        DEFAULT_DENSITIES
            .iter()
            .all(|&n| self.exercise_path(source_path.as_ref(), n).exists())
    }

    /// Read one generated exercise page
    pub fn read_exercise<P: AsRef<Path>>(&self, source_path: P, every_nth: usize) -> Result<String, std::io::Error> {
        fs::read_to_string(self.exercise_path(source_path, every_nth))
    }

    /// Count generated exercise files directly under the root
    pub fn count_exercises(&self) -> usize {
        fs::read_dir(&self.root_path)
            .expect("Failed to read fixture root")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains("_exercise_every_"))
            .count()
    }
}

/// Run a script through `node` and return its stdout, or `None` when node
/// is not installed
pub fn run_node_script(script: &str) -> Option<String> {
    let mut child = match Command::new("node")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            eprintln!("node not found on PATH, skipping script test");
            return None;
        }
        Err(e) => panic!("Failed to start node: {e}"),
    };

    child
        .stdin
        .take()
        .expect("node stdin")
        .write_all(script.as_bytes())
        .expect("Failed to send script to node");

    let output = child.wait_with_output().expect("Failed to wait for node");
    assert!(
        output.status.success(),
        "node failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Some(String::from_utf8(output.stdout).expect("node printed invalid UTF-8"))
}
