use crate::answer::normalize_answer;
use crate::error::{ExerciseError, Result};
use crate::tokenizer::Segment;

/// A word occurrence replaced by an input control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blank {
    /// 0-based, in document order
    pub index: usize,
    pub normalized_answer: String,
    pub original_text: String,
}

impl Blank {
    fn from_word(index: usize, word: &str) -> Self {
        Self {
            index,
            normalized_answer: normalize_answer(word),
            original_text: word.to_string(),
        }
    }
}

/// One piece of an exercise body: visible text or a blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyPiece {
    Text(Segment),
    Blank(Blank),
}

/// Segments with every Nth word turned into a blank
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlankedText {
    pub body: Vec<BodyPiece>,
    /// Normalized answers in blank index order
    pub answers: Vec<String>,
}

impl BlankedText {
    pub fn blanks(&self) -> impl Iterator<Item = &Blank> {
        self.body.iter().filter_map(|piece| match piece {
            BodyPiece::Blank(blank) => Some(blank),
            BodyPiece::Text(_) => None,
        })
    }

    pub fn blank_count(&self) -> usize {
        self.answers.len()
    }

    /// Visible text with blanks left out
    pub fn visible_text(&self) -> String {
        self.body
            .iter()
            .filter_map(|piece| match piece {
                BodyPiece::Text(segment) => Some(segment.text.as_str()),
                BodyPiece::Blank(_) => None,
            })
            .collect()
    }

    /// Body with every blank filled in with its original word
    pub fn revealed_text(&self) -> String {
        self.body
            .iter()
            .map(|piece| match piece {
                BodyPiece::Text(segment) => segment.text.as_str(),
                BodyPiece::Blank(blank) => blank.original_text.as_str(),
            })
            .collect()
    }
}

/// Replace every `every_nth` word with a blank
///
/// Words are counted from 1; the word whose count is a multiple of `every_nth`
/// becomes a blank. Whitespace and punctuation are never blanked. A density
/// larger than the word count yields no blanks, which is a valid result.
pub fn select_blanks(segments: &[Segment], every_nth: usize) -> Result<BlankedText> {
    if every_nth == 0 {
        return Err(ExerciseError::InvalidConfiguration { every_nth });
    }

    let mut body = Vec::with_capacity(segments.len());
    let mut answers = Vec::new();
    let mut word_count = 0usize;

    for segment in segments {
        if !segment.is_word() {
            body.push(BodyPiece::Text(segment.clone()));
            continue;
        }

        word_count += 1;
        if word_count % every_nth == 0 {
            let blank = Blank::from_word(answers.len(), &segment.text);
            answers.push(blank.normalized_answer.clone());
            body.push(BodyPiece::Blank(blank));
        } else {
            body.push(BodyPiece::Text(segment.clone()));
        }
    }

    Ok(BlankedText { body, answers })
}
