//! Kana script conversion and classification

/// Offset between a katakana code point and its hiragana counterpart
const KANA_OFFSET: u32 = 0x60;

fn kata_to_hira_char(c: char) -> char {
    match c {
        // ァ..ヶ and the iteration marks ヽヾ have direct hiragana forms
        'ァ'..='ヶ' | 'ヽ' | 'ヾ' => char::from_u32(c as u32 - KANA_OFFSET).unwrap_or(c),
        _ => c,
    }
}

fn hira_to_kata_char(c: char) -> char {
    match c {
        'ぁ'..='ゖ' | 'ゝ' | 'ゞ' => char::from_u32(c as u32 + KANA_OFFSET).unwrap_or(c),
        _ => c,
    }
}

/// Convert every katakana character to hiragana, leaving everything else as is
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars().map(kata_to_hira_char).collect()
}

/// Convert every hiragana character to katakana, leaving everything else as is
pub fn hiragana_to_katakana(text: &str) -> String {
    text.chars().map(hira_to_kata_char).collect()
}

/// True if every character lies in the hiragana/katakana blocks (ぁ..ヾ)
///
/// Includes the prolonged sound mark, the middle dot and combining
/// (han)dakuten. An empty string is considered kana.
pub fn is_kana(text: &str) -> bool {
    text.chars().all(|c| ('ぁ'..='ヾ').contains(&c))
}

/// True if every character lies in the hiragana block (ぁ..ゞ)
pub fn is_hiragana(text: &str) -> bool {
    text.chars().all(|c| ('ぁ'..='ゞ').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_katakana_to_hiragana() {
        assert_eq!(katakana_to_hiragana("ヨム"), "よむ");
        assert_eq!(katakana_to_hiragana("ヴァイオリン"), "ゔぁいおりん");
        assert_eq!(katakana_to_hiragana("カ゚ヽヾ"), "か゚ゝゞ");
        assert_eq!(katakana_to_hiragana("読ム"), "読む");
    }

    #[test]
    fn test_hiragana_to_katakana() {
        assert_eq!(hiragana_to_katakana("よむ"), "ヨム");
        assert_eq!(hiragana_to_katakana("ゕゖ"), "ヵヶ");
        // prolonged sound mark is already script-neutral
        assert_eq!(hiragana_to_katakana("らーめん"), "ラーメン");
    }

    #[test]
    fn test_is_kana() {
        assert!(is_kana("よむ"));
        assert!(is_kana("ラーメン"));
        assert!(is_kana("カタカナ・ひらがな"));
        assert!(!is_kana("読む"));
        assert!(!is_kana("abc"));
    }

    #[test]
    fn test_is_hiragana() {
        assert!(is_hiragana("よむ"));
        assert!(!is_hiragana("ヨム"));
        assert!(!is_hiragana("読む"));
    }
}
