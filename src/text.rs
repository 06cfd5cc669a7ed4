//! Text-shape helpers shared by the profiler and the strategies.

use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(&str, &str); 7] = [
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

/// Normalize block text: NFC, ligatures, non-breaking spaces, trailing
/// whitespace per line. Replacement and private-use characters are kept so
/// the OCR check can still see them.
pub fn normalize(text: &str) -> String {
    let mut result: String = text.nfc().collect();
    for (ligature, replacement) in LIGATURES {
        if result.contains(ligature) {
            result = result.replace(ligature, replacement);
        }
    }
    result = result.replace('\u{00A0}', " ");
    result
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Character count (not bytes).
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Title-cased in the strict sense: every cased run starts with an uppercase
/// letter followed only by lowercase letters, with at least one cased letter.
pub fn is_title(text: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}

/// At least one cased letter and no lowercase letters.
pub fn is_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

/// First character is uppercase.
pub fn starts_upper(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
}

/// Non-empty and made only of ASCII digits.
pub fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Ends with `.`, `!` or `?`, ignoring trailing whitespace.
pub fn ends_with_sentence_punct(text: &str) -> bool {
    text.trim_end().ends_with(['.', '!', '?'])
}

/// Share of all words longer than three characters that start uppercase,
/// measured against the total word count.
pub fn capitalized_word_ratio(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let capitalized = words
        .iter()
        .filter(|w| w.chars().count() > 3 && starts_upper(w))
        .count();
    capitalized as f64 / words.len() as f64
}

/// Whether most words longer than three characters start uppercase.
pub fn has_significant_title_case(text: &str) -> bool {
    let significant: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect();
    if significant.is_empty() {
        return false;
    }
    let capitalized = significant.iter().filter(|w| starts_upper(w)).count();
    capitalized as f64 / significant.len() as f64 > 0.7
}

/// Lowercased word set.
pub fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Jaccard similarity of lowercased word sets, 0 when either is empty.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let left = word_set(a);
    let right = word_set(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

/// Depth of a leading `1`, `1.2`, `1.2.3` style number.
pub fn numbering_depth(text: &str) -> Option<usize> {
    let mut depth = 0;
    let mut rest = text;
    loop {
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            break;
        }
        depth += 1;
        rest = &rest[digits..];
        match rest.strip_prefix('.') {
            Some(after) if after.starts_with(|c: char| c.is_ascii_digit()) => rest = after,
            _ => break,
        }
    }
    (depth > 0).then_some(depth)
}

/// Private Use Area code point.
pub fn is_pua(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

/// Printable or whitespace, excluding replacement and private-use characters.
pub fn is_readable(c: char) -> bool {
    if c.is_whitespace() {
        return true;
    }
    !(c.is_control() || c == '\u{FFFD}' || is_pua(c))
}

/// Share of readable characters, 0 for empty text.
pub fn readable_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let readable = text.chars().filter(|c| is_readable(*c)).count();
    readable as f64 / total as f64
}
