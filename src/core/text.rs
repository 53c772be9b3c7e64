//! Small text helpers shared by the engines

/// First `n` characters of `s` (whole string when shorter)
pub(crate) fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_respects_char_boundaries() {
        assert_eq!(prefix_chars("hello", 3), "hel");
        assert_eq!(prefix_chars("hi", 10), "hi");
        assert_eq!(prefix_chars("héllo", 2), "hé");
        assert_eq!(prefix_chars("", 5), "");
    }
}
