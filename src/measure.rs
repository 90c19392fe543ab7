use unicode_width::UnicodeWidthStr;

/// Width of `text` in terminal cells; wide characters take two.
pub fn text_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Widest entry of `items`, or zero when there are none.
pub fn max_width<'a>(items: impl IntoIterator<Item = &'a str>) -> usize {
    items.into_iter().map(text_width).max().unwrap_or(0)
}

/// Left-align `text` in a field of `width` cells. Never truncates.
pub fn pad(text: &str, width: usize) -> String {
    let used = text_width(text);
    let mut out = String::with_capacity(text.len() + width.saturating_sub(used));
    out.push_str(text);
    for _ in used..width {
        out.push(' ');
    }
    out
}
