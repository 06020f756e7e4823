//! Key and slug derivation.
//!
//! Field keys are lowercase ASCII words joined by `_`; content slugs use `-`.
//! Runs of anything that is not `[a-z0-9]` collapse into one separator and
//! separators never lead or trail.

/// Derives a field key from a human label: `"Contact Email!"` → `contact_email`.
pub fn derive_key(label: &str) -> String {
    join_alphanumeric_runs(label, '_')
}

/// Derives a URL slug from text: `"Hello, World"` → `hello-world`.
pub fn derive_slug(text: &str) -> String {
    join_alphanumeric_runs(text, '-')
}

/// Returns true if `key` is non-empty and only contains `[a-z0-9_]`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

fn join_alphanumeric_runs(text: &str, separator: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push(separator);
            }
            pending_separator = false;
            out.push(c);
        } else {
            pending_separator = true;
        }
    }
    out
}
