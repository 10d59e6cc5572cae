// Exercise catalogue: one JSON record per generated page, consumed by the
// lesson index app to list exercises by lesson and difficulty.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::config::Difficulty;
use crate::exercise::ExerciseDocument;
use crate::render::RenderedBlank;

/// Catalogue format version
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Length of the description preview, in characters
pub const DESCRIPTION_CHARS: usize = 200;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    /// Output path below the output root without its extension, unique per exercise
    pub id: String,
    pub filename: String,
    pub title: String,
    pub description: String,
    pub lesson_number: u32,
    pub difficulty: Difficulty,
    pub difficulty_level: u8,
    pub exercise_type: String,
    pub blank_count: usize,
    pub blanks: Vec<RenderedBlank>,
    pub url: String,
    /// Unix seconds
    pub created_at: u64,
}

impl ExerciseRecord {
    /// `url` is the output path relative to the output root, `/`-separated;
    /// the id is the url without its extension, so it stays unique when
    /// lessons in different folders share a stem.
    pub fn from_document(
        doc: &ExerciseDocument,
        difficulty: Difficulty,
        url: &str,
        created_at: u64,
    ) -> Self {
        let id = url.strip_suffix(".html").unwrap_or(url).to_string();
        let filename = url.rsplit('/').next().unwrap_or(url).to_string();
        let blanks: Vec<RenderedBlank> = doc.blanks().map(RenderedBlank::from).collect();

        Self {
            id,
            filename,
            title: doc.source_name.clone(),
            description: describe(&doc.content.visible_text()),
            lesson_number: lesson_number(&doc.source_name),
            difficulty,
            difficulty_level: difficulty.level(),
            exercise_type: doc.variant.exercise_type(),
            blank_count: blanks.len(),
            blanks,
            url: url.to_string(),
            created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    pub total_exercises: usize,
    /// Unix seconds
    pub generated_at: u64,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Manifest {
    pub metadata: ManifestMetadata,
    pub exercises: Vec<ExerciseRecord>,
}

impl Manifest {
    /// Sorts records by lesson number, then difficulty level
    pub fn new(mut exercises: Vec<ExerciseRecord>, generated_at: u64) -> Self {
        exercises.sort_by(|a, b| {
            a.lesson_number
                .cmp(&b.lesson_number)
                .then(a.difficulty_level.cmp(&b.difficulty_level))
                .then_with(|| a.id.cmp(&b.id))
        });

        Self {
            metadata: ManifestMetadata {
                total_exercises: exercises.len(),
                generated_at,
                version: MANIFEST_VERSION.to_string(),
            },
            exercises,
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        fs::write(path, content).await?;
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Lesson number from a name like `les12` or `les12_extra`, 0 when absent
pub fn lesson_number(name: &str) -> u32 {
    let mut rest = name;
    while let Some(pos) = rest.find("les") {
        let after = &rest[pos + 3..];
        let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
        if let Ok(num) = digits.parse() {
            return num;
        }
        rest = after;
    }
    0
}

/// Preview of the exercise text: first characters, trimmed, `...` when cut
pub fn describe(text: &str) -> String {
    let mut description: String = text.chars().take(DESCRIPTION_CHARS).collect();
    description = description.trim().to_string();
    if text.chars().count() > DESCRIPTION_CHARS {
        description.push_str("...");
    }
    description
}
