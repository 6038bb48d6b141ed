//! Search query compaction and placeholder images.

/// Query used when a description compacts to nothing.
pub const FALLBACK_QUERY: &str = "business presentation";

/// Maximum number of words kept in a compacted query.
const MAX_TERMS: usize = 4;

/// Reduce a free-text description to a short search query.
///
/// Lower-cases, replaces punctuation with spaces, drops words of two
/// characters or fewer and keeps the first four that remain.
pub fn compact_query(description: &str) -> String {
    let cleaned: String = description
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c.is_whitespace() { c } else { ' ' })
        .collect();

    let terms: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .take(MAX_TERMS)
        .collect();

    if terms.is_empty() {
        FALLBACK_QUERY.to_string()
    } else {
        terms.join(" ")
    }
}

/// Neutral placeholder image for a compacted query.
///
/// The same query always maps to the same image.
pub fn placeholder_url(query: &str) -> String {
    format!("https://picsum.photos/800/600?random={}", fnv1a(query) % 1000)
}

// Stable across builds and platforms, unlike `DefaultHasher`.
fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}
