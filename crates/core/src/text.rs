//! Text normalization helpers shared by search, binding parsing, and the
//! in-memory reference store.

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a comma-separated widget value into trimmed, non-empty items.
///
/// Fullwidth commas (`，`) and ideographic commas (`、`) are accepted as
/// separators because bindings are frequently pasted from CJK prompt text.
pub fn parse_comma_list(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == '，' || c == '、')
        .map(|item| normalize_text(item))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Normalize a tag list: whitespace-normalize each tag, drop empties, and
/// de-duplicate case-insensitively while keeping the first casing seen.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let tag = normalize_text(tag.as_ref());
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_lowercase()) {
            out.push(tag);
        }
    }
    out
}

/// Maximum characters of a list-row positive-prompt preview.
pub const PREVIEW_LENGTH: usize = 96;

/// Truncate a positive prompt body for list rows, appending an ellipsis
/// when anything was cut. Operates on characters, not bytes.
pub fn positive_preview(positive: &str) -> String {
    let positive = normalize_text(positive);
    if positive.chars().count() <= PREVIEW_LENGTH {
        return positive;
    }
    let cut: String = positive.chars().take(PREVIEW_LENGTH - 1).collect();
    format!("{}…", cut.trim_end())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
