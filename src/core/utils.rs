/// Truncate a string to at most `max_chars` characters, appending a marker
/// when something was cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    let mut chars = s.char_indices();
    match chars.nth(max_chars) {
        Some((idx, _)) => format!("{}... (truncated)", &s[..idx]),
        None => s.to_string(),
    }
}

/// Convert a kilobyte count (as reported by /proc) to megabytes
pub fn kb_to_mb(kb: u64) -> f64 {
    kb as f64 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello... (truncated)");
        assert_eq!(truncate_chars("한글입니다", 2), "한글... (truncated)");
    }

    #[test]
    fn test_kb_to_mb() {
        assert_eq!(kb_to_mb(1024), 1.0);
        assert_eq!(kb_to_mb(512), 0.5);
        assert_eq!(kb_to_mb(0), 0.0);
    }
}
