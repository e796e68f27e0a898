//! Token estimation
//!
//! A provider-independent approximation: one token per four characters.

/// Estimate the number of tokens in `text`
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    chars.div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        // Counted in characters, not bytes
        assert_eq!(estimate_tokens("日本語のテキスト"), 2);
    }
}
