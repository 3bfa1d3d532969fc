use scraper::{Html, Selector};

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain text of every `<p>` element, one paragraph per line.
///
/// Markup inside a paragraph is dropped and its whitespace normalized with
/// [`normalize_whitespace`]. Paragraphs left empty are skipped, so the
/// result never contains blank lines. Parsing is lenient: broken HTML still
/// yields whatever paragraphs the parser recovers.
pub fn extract_paragraph_text(html: &str) -> String {
    let Ok(paragraph) = Selector::parse("p") else {
        return String::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&paragraph)
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
