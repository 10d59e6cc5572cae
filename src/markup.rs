// First scanning phase: flatten markup into a plain text stream.
// Tag semantics are ignored: block and inline tags vanish alike.

/// Strip and normalize markup in one call
pub fn extract_text(markup: &str) -> String {
    normalize_whitespace(&strip_tags(markup))
}

/// Remove every tag from markup, keeping inline text content
///
/// A tag is a `<` followed by at least one character and closed by the first
/// `>` after it. A `<` that is never closed, or an empty `<>`, is not a tag and
/// stays in the output as literal text.
pub fn strip_tags(markup: &str) -> String {
    let mut result = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        match after_open.find('>') {
            Some(close) if close > 0 => {
                // Skip the whole tag including both brackets
                rest = &after_open[close + 1..];
            }
            _ => {
                result.push('<');
                rest = after_open;
            }
        }
    }

    result.push_str(rest);
    result
}

/// Normalize whitespace of tag-stripped text
///
/// - `\r\n` and lone `\r` count as one line break
/// - runs of horizontal whitespace collapse to a single space
/// - a whitespace stretch from one line break to a later one becomes exactly one blank line
/// - leading and trailing whitespace of the whole text is trimmed
pub fn normalize_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut prev_was_horizontal = false;

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                collapsed.push('\n');
                prev_was_horizontal = false;
            }
            '\n' => {
                collapsed.push('\n');
                prev_was_horizontal = false;
            }
            _ if is_horizontal_space(ch) => {
                if !prev_was_horizontal {
                    collapsed.push(' ');
                    prev_was_horizontal = true;
                }
            }
            _ => {
                collapsed.push(ch);
                prev_was_horizontal = false;
            }
        }
    }

    collapse_blank_lines(&collapsed).trim().to_string()
}

/// Any whitespace that does not end a line
fn is_horizontal_space(ch: char) -> bool {
    ch.is_whitespace() && !is_line_terminator(ch)
}

fn is_line_terminator(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// Replace each whitespace stretch running from a `\n` to a later `\n` with `\n\n`
///
/// Whitespace before the first break and after the last break of a run is kept,
/// so a single line break is never widened.
fn collapse_blank_lines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut run_start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            run_start.get_or_insert(idx);
            continue;
        }
        if let Some(start) = run_start.take() {
            push_whitespace_run(&text[start..idx], &mut result);
        }
        result.push(ch);
    }

    if let Some(start) = run_start {
        push_whitespace_run(&text[start..], &mut result);
    }

    result
}

fn push_whitespace_run(run: &str, out: &mut String) {
    match (run.find('\n'), run.rfind('\n')) {
        (Some(first), Some(last)) if first != last => {
            out.push_str(&run[..first]);
            out.push_str("\n\n");
            out.push_str(&run[last + 1..]);
        }
        _ => out.push_str(run),
    }
}
