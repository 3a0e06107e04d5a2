use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = UnicodeWidthStr::width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Right-pad `s` with spaces so it occupies exactly `cells` terminal cells.
/// Strings already wider than `cells` are returned unchanged.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let width = display_width(s);
    if width >= cells {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + cells - width);
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', cells - width));
    out
}

/// The first `n` grapheme clusters of `s`.
pub fn take_graphemes(s: &str, n: usize) -> &str {
    match s.grapheme_indices(true).nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
