// Generation pass for one source: tokenize once, blank each variant independently.

use crate::blanks::{select_blanks, Blank, BlankedText, BodyPiece};
use crate::config::{Variant, VariantSet};
use crate::error::Result;
use crate::tokenizer::{count_words, tokenize, Segment};

/// One exercise for one (source, variant) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseDocument {
    /// Stable source name, the file stem of the lesson
    pub source_name: String,
    pub variant: Variant,
    pub content: BlankedText,
    /// Word count of the source text
    pub word_count: usize,
}

impl ExerciseDocument {
    pub fn body(&self) -> &[BodyPiece] {
        &self.content.body
    }

    pub fn answers(&self) -> &[String] {
        &self.content.answers
    }

    pub fn blanks(&self) -> impl Iterator<Item = &Blank> {
        self.content.blanks()
    }
}

/// Build one exercise per configured variant for a markup source
///
/// Either every variant is produced or none is; a `VariantSet` is never empty.
pub fn build_exercises(
    markup: &str,
    source_name: &str,
    variants: &VariantSet,
) -> Result<Vec<ExerciseDocument>> {
    let segments = tokenize(markup);
    build_exercises_from_segments(&segments, source_name, variants)
}

/// Same as [`build_exercises`] for text that is already tokenized
pub fn build_exercises_from_segments(
    segments: &[Segment],
    source_name: &str,
    variants: &VariantSet,
) -> Result<Vec<ExerciseDocument>> {
    let word_count = count_words(segments);

    variants
        .iter()
        .map(|variant| -> Result<ExerciseDocument> {
            let content = select_blanks(segments, variant.every_nth)?;
            Ok(ExerciseDocument {
                source_name: source_name.to_string(),
                variant: *variant,
                content,
                word_count,
            })
        })
        .collect()
}
