//! Korean → English name and title mappings for interview searches.
//!
//! Interviews with international investors are indexed under their English
//! names, so Korean transliterations are mapped before searching.

const ENGLISH_NAMES: &[(&str, &str)] = &[
    ("워렌 버핏", "Warren Buffett"),
    ("워런 버핏", "Warren Buffett"),
    ("찰리 멍거", "Charlie Munger"),
    ("일론 머스크", "Elon Musk"),
    ("제프 베조스", "Jeff Bezos"),
    ("빌 게이츠", "Bill Gates"),
    ("스티브 잡스", "Steve Jobs"),
    ("레이 달리오", "Ray Dalio"),
    ("피터 린치", "Peter Lynch"),
    ("조지 소로스", "George Soros"),
    ("짐 로저스", "Jim Rogers"),
    ("하워드 막스", "Howard Marks"),
    ("벤저민 그레이엄", "Benjamin Graham"),
    ("필립 피셔", "Philip Fisher"),
    ("존 템플턴", "John Templeton"),
    ("켄 피셔", "Ken Fisher"),
    ("세스 클라만", "Seth Klarman"),
    ("조엘 그린블라트", "Joel Greenblatt"),
];

// Longest phrase first; only the first match is applied
const TITLE_TRANSLATIONS: &[(&str, &str)] = &[
    ("버크셔 해서웨이 주주총회", "Berkshire Hathaway shareholders meeting"),
    ("주주총회", "shareholders meeting"),
    ("인터뷰", "interview"),
];

/// English name for a known international figure.
pub(crate) fn english_name(person: &str) -> Option<&'static str> {
    ENGLISH_NAMES
        .iter()
        .find(|(korean, _)| *korean == person)
        .map(|(_, english)| *english)
}

/// Replace the first known Korean phrase in a video title with English.
pub(crate) fn translate_title(title: &str) -> String {
    TITLE_TRANSLATIONS
        .iter()
        .find(|(korean, _)| title.contains(korean))
        .map(|(korean, english)| title.replace(korean, english))
        .unwrap_or_else(|| title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_name() {
        assert_eq!(english_name("워런 버핏"), Some("Warren Buffett"));
        assert_eq!(english_name("홍길동"), None);
    }

    #[test]
    fn test_translate_title_first_match_only() {
        assert_eq!(
            translate_title("2023 버크셔 해서웨이 주주총회 인터뷰"),
            "2023 Berkshire Hathaway shareholders meeting 인터뷰"
        );
        assert_eq!(translate_title("CNBC 인터뷰"), "CNBC interview");
        assert_eq!(translate_title("강연"), "강연");
    }
}
