//! Helpers for the pipe-delimited list fields used by episode databases
//! (genres, directors, writers, guest stars).

/// Separator used by the episode database for multi-valued fields.
pub(crate) const LIST_DELIMITER: char = '|';

/// Splits a delimited field into trimmed, non-empty entries.
///
/// Order is preserved and duplicates are kept; see [`dedupe`].
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Removes duplicate entries, keeping the first occurrence of each.
pub(crate) fn dedupe(entries: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !unique.contains(&entry) {
            unique.push(entry);
        }
    }
    unique
}

/// Joins entries back into a single delimited field.
pub(crate) fn join_list(entries: &[String]) -> String {
    entries.join(&LIST_DELIMITER.to_string())
}

/// Splits a delimited field and removes duplicates in one step.
pub(crate) fn unique_list(value: &str) -> Vec<String> {
    dedupe(split_list(value))
}

/// True when the optional value holds a non-blank string.
pub(crate) fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
