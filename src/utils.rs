//! Small helpers shared across the crate
//!
//! Tokens end up in log lines; these helpers keep them short and keep
//! secrets out, while respecting UTF-8 boundaries.

/// Number of leading characters [`redact`] keeps
pub const REDACT_KEEP: usize = 8;

/// Safely truncate a string at a UTF-8 character boundary.
///
/// Returns a slice of at most `max_bytes` bytes.
///
/// # Example
/// ```
/// use spa_auth::utils::safe_truncate;
///
/// // Emoji is 4 bytes - truncating at byte 10 would cut it in half
/// let text = "Status: 🔍 Active";
/// assert_eq!(safe_truncate(text, 10), "Status: ");
/// ```
#[inline]
#[must_use]
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    &s[..boundary]
}

/// Shorten a token for logging.
///
/// Keeps the first few bytes and the total length so two tokens can be told
/// apart in logs without revealing them.
///
/// # Example
/// ```
/// use spa_auth::utils::redact;
///
/// assert_eq!(redact("eyJhbGciOiJSUzI1NiJ9.payload.sig"), "eyJhbGci…(32 bytes)");
/// assert_eq!(redact(""), "(empty)");
/// ```
#[must_use]
pub fn redact(token: &str) -> String {
    if token.is_empty() {
        return "(empty)".to_string();
    }
    format!(
        "{}…({} bytes)",
        safe_truncate(token, REDACT_KEEP),
        token.len()
    )
}

/// Split a compact JWT into its three segments.
///
/// Returns `None` unless there are exactly three segments and the header and
/// payload are non-empty.
#[must_use]
pub fn split_compact_jwt(token: &str) -> Option<(&str, &str, &str)> {
    let mut parts = token.split('.');
    let header = parts.next()?;
    let payload = parts.next()?;
    let signature = parts.next()?;
    if parts.next().is_some() || header.is_empty() || payload.is_empty() {
        return None;
    }
    Some((header, payload, signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate_ascii() {
        assert_eq!(safe_truncate("hello world", 5), "hello");
        assert_eq!(safe_truncate("hi", 10), "hi");
        assert_eq!(safe_truncate("", 3), "");
    }

    #[test]
    fn test_safe_truncate_multibyte() {
        // 'é' is 2 bytes; cutting inside it backs off
        assert_eq!(safe_truncate("café", 4), "caf");
        assert_eq!(safe_truncate("café", 5), "café");
    }

    #[test]
    fn test_redact_short_token() {
        assert_eq!(redact("abc"), "abc…(3 bytes)");
    }

    #[test]
    fn test_split_compact_jwt() {
        assert_eq!(split_compact_jwt("a.b.c"), Some(("a", "b", "c")));
        assert_eq!(split_compact_jwt("a.b."), Some(("a", "b", "")));
        assert_eq!(split_compact_jwt("a.b"), None);
        assert_eq!(split_compact_jwt("a.b.c.d"), None);
        assert_eq!(split_compact_jwt(".b.c"), None);
    }
}
