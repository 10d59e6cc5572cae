pub mod answer;
pub mod blanks;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exercise;
pub mod incremental;
pub mod manifest;
pub mod markup;
pub mod parallel_processing;
pub mod reader;
pub mod render;
pub mod tokenizer;

// Re-export the generation core
pub use answer::{is_correct, normalize_answer, CLIENT_NORMALIZE_JS};
pub use blanks::{select_blanks, Blank, BlankedText, BodyPiece};
pub use config::{Difficulty, GenerationConfig, Variant, VariantSet, DEFAULT_EVERY_NTH};
pub use error::{ExerciseError, Result};
pub use exercise::{build_exercises, ExerciseDocument};
pub use markup::extract_text;
pub use render::{extract_blanks, render_exercise, RenderOptions, RenderedBlank, EXERCISE_JS};
pub use tokenizer::{tokenize, Segment, SegmentKind};

// Re-export batch processing for the CLI and benchmarks
pub use discovery::{collect_discovered_files, find_lesson_files, DiscoveryConfig};
pub use incremental::{generate_exercise_path, is_generated_exercise};
pub use manifest::{ExerciseRecord, Manifest};
pub use parallel_processing::{process_files_parallel, process_source, FileStats, FileStatus, RunStats};
