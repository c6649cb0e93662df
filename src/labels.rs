use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static EMOTION_LABELS: [(&str, &str); 27] = [
    ("happy", "행복"),
    ("joy", "기쁨"),
    ("excited", "설렘"),
    ("calm", "평온"),
    ("peaceful", "평온"),
    ("relaxed", "편안"),
    ("grateful", "감사"),
    ("love", "사랑"),
    ("proud", "뿌듯"),
    ("hopeful", "희망"),
    ("content", "만족"),
    ("sad", "슬픔"),
    ("lonely", "외로움"),
    ("depressed", "우울"),
    ("angry", "분노"),
    ("annoyed", "짜증"),
    ("anxious", "불안"),
    ("worried", "걱정"),
    ("scared", "두려움"),
    ("stressed", "스트레스"),
    ("tired", "피곤"),
    ("bored", "지루함"),
    ("confused", "혼란"),
    ("disappointed", "실망"),
    ("embarrassed", "부끄러움"),
    ("surprised", "놀람"),
    ("neutral", "무난"),
];

static LABEL_TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| EMOTION_LABELS.iter().copied().collect());

static HANGUL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\p{Hangul}").ok());

/// True when the label already holds at least one Hangul character.
pub fn is_canonical(label: &str) -> bool {
    HANGUL.as_ref().is_some_and(|re| re.is_match(label))
}

/// Case-insensitive lookup of a foreign label in the fixed table.
pub fn translate(label: &str) -> Option<&'static str> {
    let key = label.trim().to_lowercase();
    LABEL_TABLE.get(key.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_every_entry() {
        assert_eq!(LABEL_TABLE.len(), 27);
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(translate("Happy"), Some("행복"));
        assert_eq!(translate("  JOY "), Some("기쁨"));
        assert_eq!(translate("grumpy"), None);
    }

    #[test]
    fn hangul_pattern_compiles() {
        assert!(HANGUL.is_some());
    }

    #[test]
    fn canonical_detection() {
        assert!(is_canonical("평온"));
        assert!(is_canonical("so 행복"));
        assert!(is_canonical("ㅠㅠ"));
        assert!(!is_canonical("Happy"));
        assert!(!is_canonical(""));
    }

    #[test]
    fn every_target_is_canonical() {
        for (_, target) in EMOTION_LABELS {
            assert!(is_canonical(target), "{target} should be canonical");
        }
    }
}
