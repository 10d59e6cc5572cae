// HTML rendering of exercise documents, plus reading blanks back out of a rendered page.

use crate::answer::CLIENT_NORMALIZE_JS;
use crate::blanks::{Blank, BodyPiece};
use crate::config::ordinal_suffix;
use crate::exercise::ExerciseDocument;
use serde::{Deserialize, Serialize};

const EXERCISE_CSS: &str = include_str!("../assets/exercise.css");

/// Page script: answer checking, reveal and reset; expects `normalizeText` in scope
pub const EXERCISE_JS: &str = include_str!("../assets/exercise.js");

/// Smallest `size` attribute of a blank input
pub const MIN_INPUT_SIZE: usize = 8;

/// Page-level rendering options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Value of the `lang` attribute on `<html>`
    pub lang: String,
    /// Target of a "Back to Exercises" link at the top of the page
    pub index_href: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            lang: "nl".to_string(),
            index_href: None,
        }
    }
}

/// A blank as stored in a rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedBlank {
    pub index: usize,
    pub answer: String,
    pub original: String,
    pub size: usize,
}

impl From<&Blank> for RenderedBlank {
    fn from(blank: &Blank) -> Self {
        Self {
            index: blank.index,
            answer: blank.normalized_answer.clone(),
            original: blank.original_text.clone(),
            size: input_size(&blank.original_text),
        }
    }
}

/// Width of a blank input: the word length, at least [`MIN_INPUT_SIZE`]
pub fn input_size(original: &str) -> usize {
    original.chars().count().max(MIN_INPUT_SIZE)
}

/// Render a complete standalone exercise page
pub fn render_exercise(doc: &ExerciseDocument, options: &RenderOptions) -> String {
    let name = escape_attr(&doc.source_name);
    let lang = escape_attr(&options.lang);
    let version = doc.variant.ordinal;
    let nth = ordinal_suffix(doc.variant.every_nth);
    let count = doc.answers().len();
    let body = render_body(doc.body());
    let back_link = options.index_href.as_deref().map(render_back_link).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name} - Fill-in-the-blank Exercise (Version {version})</title>
    <style>
{EXERCISE_CSS}    </style>
</head>
<body>
{back_link}    <div class="header">
        <h1>{name} - Fill-in-the-blank Exercise</h1>
        <div class="version-info">Version {version}: Every {nth} word removed</div>
    </div>

    <div class="instructions">
        <strong>Instructions:</strong> Fill in the blanks with the appropriate words.
        This exercise removes every {nth} word from the original text.
        <br><strong>Tip:</strong> Use the "Check Answers" button to see your results!
    </div>

    <div class="controls">
        <button class="btn" onclick="checkAnswers()">Check Answers</button>
        <button class="btn" onclick="showAnswers()">Show All Answers</button>
        <button class="btn" onclick="resetExercise()">Reset</button>
        <div class="score" id="score" style="display: none;"></div>
        <div class="feedback" id="feedback"></div>
    </div>

    <div class="exercise-content" data-blank-count="{count}">{body}</div>

    <script>
{CLIENT_NORMALIZE_JS}

{EXERCISE_JS}    </script>
</body>
</html>
"#
    )
}

fn render_back_link(href: &str) -> String {
    format!(
        r#"    <div class="back-button-container"><a href="{}" class="back-button"><svg class="back-button-icon" xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24" stroke="currentColor"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M10 19l-7-7m0 0l7-7m-7 7h18"></path></svg>Back to Exercises</a></div>
"#,
        escape_attr(href)
    )
}

/// Render body pieces: text escaped, blanks as inputs
pub fn render_body(pieces: &[BodyPiece]) -> String {
    let mut html = String::new();
    for piece in pieces {
        match piece {
            BodyPiece::Text(segment) => html.push_str(&escape_text(&segment.text)),
            BodyPiece::Blank(blank) => html.push_str(&render_blank(blank)),
        }
    }
    html
}

/// Input control carrying the answer key, the original word and the blank index
pub fn render_blank(blank: &Blank) -> String {
    format!(
        r#"<input type="text" class="fill-blank" size="{}" data-answer="{}" data-original="{}" data-index="{}" placeholder="____" />"#,
        input_size(&blank.original_text),
        escape_attr(&blank.normalized_answer),
        escape_attr(&blank.original_text),
        blank.index,
    )
}

/// Read every blank back out of a rendered page, in document order
pub fn extract_blanks(html: &str) -> Vec<RenderedBlank> {
    let mut blanks = Vec::new();
    let mut rest = html;

    while let Some(start) = rest.find("<input") {
        let tag_and_after = &rest[start..];
        let Some(end) = tag_and_after.find('>') else {
            break;
        };
        let tag = &tag_and_after[..end];
        rest = &tag_and_after[end + 1..];

        if !tag.contains(r#"class="fill-blank""#) {
            continue;
        }

        let index = attr(tag, "data-index").and_then(|v| v.parse().ok());
        let (Some(index), Some(answer), Some(original)) =
            (index, attr(tag, "data-answer"), attr(tag, "data-original"))
        else {
            continue;
        };

        blanks.push(RenderedBlank {
            index,
            answer: unescape_attr(answer),
            original: unescape_attr(original),
            size: attr(tag, "size")
                .and_then(|v| v.parse().ok())
                .unwrap_or(MIN_INPUT_SIZE),
        });
    }

    blanks
}

fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

/// Escape a value for use inside a double-quoted attribute
pub fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// Entities in lesson text are kept as written; only stray brackets are escaped
fn escape_text(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}
