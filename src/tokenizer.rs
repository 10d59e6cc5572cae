// Second scanning phase: split flat text into word and non-word segments.
// Concatenating the segments of a text always reproduces that text exactly.

use crate::answer::is_word_char;
use crate::markup::extract_text;

/// Character class of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Run of word characters; the only kind that can become a blank
    Word,
    /// Run of whitespace
    Whitespace,
    /// Run of anything else: punctuation, symbols, stray brackets
    Punctuation,
}

impl SegmentKind {
    fn of(ch: char) -> Self {
        if is_word_char(ch) {
            SegmentKind::Word
        } else if ch.is_whitespace() {
            SegmentKind::Whitespace
        } else {
            SegmentKind::Punctuation
        }
    }
}

/// Atomic unit of tokenized text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        Self { text: text.into(), kind }
    }

    pub fn is_word(&self) -> bool {
        self.kind == SegmentKind::Word
    }
}

/// Tokenize a markup document: strip tags, normalize whitespace, then split
pub fn tokenize(markup: &str) -> Vec<Segment> {
    tokenize_text(&extract_text(markup))
}

/// Split already-flattened text into maximal runs of one character class
pub fn tokenize_text(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut run_start = 0;
    let mut run_kind: Option<SegmentKind> = None;

    for (idx, ch) in text.char_indices() {
        let kind = SegmentKind::of(ch);
        match run_kind {
            Some(current) if current == kind => {}
            Some(current) => {
                segments.push(Segment::new(&text[run_start..idx], current));
                run_start = idx;
                run_kind = Some(kind);
            }
            None => run_kind = Some(kind),
        }
    }

    if let Some(kind) = run_kind {
        segments.push(Segment::new(&text[run_start..], kind));
    }

    segments
}

/// Number of word segments
pub fn count_words(segments: &[Segment]) -> usize {
    segments.iter().filter(|s| s.is_word()).count()
}

/// Reassemble the text the segments were cut from
pub fn concat_segments(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}
