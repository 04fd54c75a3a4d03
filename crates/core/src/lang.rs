//! Script detection helpers.

/// Returns true if the text contains at least one CJK unified ideograph.
///
/// Used to decide whether a field is already in the target display language
/// (Chinese) or still needs provider metadata / machine translation.
pub fn contains_chinese(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_chinese() {
        assert!(contains_chinese("测试影片"));
        assert!(contains_chinese("STARS-123 测试"));
    }

    #[test]
    fn test_latin_only() {
        assert!(!contains_chinese("STARS-123 Some Title"));
        assert!(!contains_chinese(""));
    }

    #[test]
    fn test_japanese_kana_is_not_chinese() {
        // Kana blocks are outside the unified ideograph range; kanji are inside.
        assert!(!contains_chinese("アイドル"));
        assert!(contains_chinese("新人アイドル")); // 新人 are ideographs
    }
}
