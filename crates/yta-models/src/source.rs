//! Citation source categories.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category of a cited source, serialized with its Korean label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceType {
    Book,
    Interview,
    Article,
    ShareholderLetter,
    Paper,
    Sns,
    Report,
    Video,
    #[default]
    Unknown,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Book => "책",
            SourceType::Interview => "인터뷰 영상",
            SourceType::Article => "기사",
            SourceType::ShareholderLetter => "주주서한",
            SourceType::Paper => "논문",
            SourceType::Sns => "SNS",
            SourceType::Report => "보고서",
            SourceType::Video => "영상",
            SourceType::Unknown => "출처 확인 필요",
        }
    }

    /// Parse a label produced by the model. Never fails; unrecognised labels are `Unknown`.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "책" | "도서" => SourceType::Book,
            "인터뷰 영상" | "인터뷰" => SourceType::Interview,
            "기사" | "뉴스" => SourceType::Article,
            "주주서한" => SourceType::ShareholderLetter,
            "논문" => SourceType::Paper,
            "SNS" | "sns" => SourceType::Sns,
            "보고서" | "리포트" => SourceType::Report,
            "영상" => SourceType::Video,
            _ => SourceType::Unknown,
        }
    }

    /// Video-like sources are looked up on YouTube first.
    pub fn is_video(&self) -> bool {
        matches!(self, SourceType::Interview | SourceType::Video)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(SourceType::parse(&label))
    }
}
