//! Domain keys shared by every per-domain table

/// Canonical key for `domain`: trimmed, lowercased, trailing dot removed.
///
/// `None` for keys that are empty or contain whitespace.
pub fn domain_key(domain: &str) -> Option<String> {
    let key = domain.trim().trim_end_matches('.').to_ascii_lowercase();

    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    Some(key)
}
