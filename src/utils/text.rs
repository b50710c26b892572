//! Column layout for terminal listings.

use unicode_width::UnicodeWidthStr;

/// Pad `text` with spaces to `width` terminal columns. Wider text is
/// returned unchanged.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    let mut padded = String::with_capacity(text.len() + width.saturating_sub(used));
    padded.push_str(text);
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    padded
}

/// Widest entry in columns, for aligning a listing.
pub fn column_width<'a>(items: impl IntoIterator<Item = &'a str>) -> usize {
    items
        .into_iter()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

/// First line of `text`, cut to `max` characters with "..." when longer.
pub fn snippet(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    let mut chars = line.chars();
    let head: String = chars.by_ref().take(max).collect();
    let cut = chars.next().is_some() || text.trim().lines().nth(1).is_some();
    if cut {
        format!("{head}...")
    } else {
        head
    }
}
