// Lesson fixtures with known word counts and blank positions

/// Short Dutch lesson used across the pipeline tests
///
/// Extracted text: "Les 1\n\nDe kat zit op de mat. De hond ligt in de mand." (14 words)
pub const SIMPLE_LESSON: &str = "<h1>Les 1</h1>\n\n<p>De kat zit op de mat. De hond ligt in de mand.</p>";
pub const SIMPLE_LESSON_WORDS: usize = 14;

/// Blanks of SIMPLE_LESSON per density, as normalized answers
pub const SIMPLE_ANSWERS_5TH: [&str; 2] = ["zit", "hond"];
pub const SIMPLE_ANSWERS_6TH: [&str; 2] = ["op", "in"];
pub const SIMPLE_ANSWERS_7TH: [&str; 2] = ["de", "mand"];

/// Lesson with diacritics, mixed case and inline markup
pub const ACCENTED_LESSON: &str = r#"<html><head><title>Les 2</title></head>
<body>
  <p>Één <b>Café</b> in Zürich, één crème brûlée.</p>
  <p>Naïeve coördinatie; geëerde Ångström!</p>
</body></html>"#;

/// Lesson with fewer words than any default density
pub const TINY_LESSON: &str = "<p>Hallo wereld</p>";

/// Markup with an empty `<>` and an unclosed tag, both kept as literal text
///
/// Words: Een twee drie vier vijf zes zeven acht negen tien elf open (12)
pub const MALFORMED_LESSON: &str = "<p>Een twee drie <> vier vijf zes zeven <i>acht</i> negen tien elf <open";

/// Builds a lesson of `n` numbered words, `w1 w2 ... wn`
pub fn numbered_lesson(n: usize) -> String {
    let words: Vec<String> = (1..=n).map(|i| format!("w{i}")).collect();
    format!("<p>{}</p>", words.join(" "))
}
