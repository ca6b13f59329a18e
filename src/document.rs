use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static title selector"));

pub fn parse(body: &str) -> Html {
    Html::parse_document(body)
}

/// Concatenated text of an element, as the page shows it.
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Text with inner whitespace collapsed and ends trimmed.
pub fn clean_text_of(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

pub fn first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

pub fn title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(clean_text_of)
        .filter(|t| !t.is_empty())
}

/// Serialized document cut to at most `max_chars` characters.
pub fn preview(document: &Html, max_chars: usize) -> String {
    let html = document.root_element().html();
    match html.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &html[..cut]),
        None => html,
    }
}
