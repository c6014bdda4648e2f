//! Text helpers shared by the normalizers and the search filters.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lower-cased, accent-free form used for alias and filter matching.
///
/// `"València"` and `"VALENCIA"` both fold to `"valencia"`.
pub fn fold(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Title case where every letter following a non-letter is upper-cased.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.trim().chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Case and accent insensitive substring test. An empty needle matches.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    let needle = fold(needle);
    needle.is_empty() || fold(haystack).contains(&needle)
}

/// Left-pad a sequence number with zeros to `width` digits
pub fn zero_pad(value: i64, width: usize) -> String {
    format!("{:0width$}", value, width = width)
}
