//! Language guess from character ranges.

const TURKISH: &str = "çğıöşüÇĞİÖŞÜ";

/// Best-effort ISO 639-1 code for `text`. Script ranges are checked by
/// count; Turkish-specific Latin letters mark Turkish, plain Latin falls
/// back to English.
pub fn detect_language(text: &str) -> &'static str {
    let mut counts = [0usize; 7];
    for c in text.chars() {
        let slot = match c {
            '\u{0400}'..='\u{04FF}' => 0,
            '\u{0600}'..='\u{06FF}' => 1,
            '\u{3040}'..='\u{30FF}' => 2,
            '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}' => 3,
            '\u{4E00}'..='\u{9FFF}' => 4,
            '\u{0370}'..='\u{03FF}' => 5,
            c if TURKISH.contains(c) => 6,
            _ => continue,
        };
        counts[slot] += 1;
    }

    // Kana anywhere means Japanese even when kanji dominate.
    if counts[2] > 0 {
        return "ja";
    }
    let codes = ["ru", "ar", "ja", "ko", "zh", "el", "tr"];
    counts
        .iter()
        .enumerate()
        .filter(|(_, n)| **n > 0)
        .max_by_key(|(_, n)| **n)
        .map(|(i, _)| codes[i])
        .unwrap_or("en")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_scripts() {
        assert_eq!(detect_language("Çok kez unutulup gidenin ardından"), "tr");
        assert_eq!(detect_language("Привет мир"), "ru");
        assert_eq!(detect_language("مرحبا"), "ar");
        assert_eq!(detect_language("こんにちは世界"), "ja");
        assert_eq!(detect_language("안녕하세요"), "ko");
        assert_eq!(detect_language("你好世界"), "zh");
        assert_eq!(detect_language("Καλημέρα"), "el");
        assert_eq!(detect_language("Hello world"), "en");
        assert_eq!(detect_language(""), "en");
    }
}
