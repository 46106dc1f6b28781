//! Critical analysis perspectives.

use yta_models::PerspectiveInfo;

/// An investment viewpoint the critical analysis is written from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perspective {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// What the analysis should concentrate on
    pub focus_area: &'static str,
}

pub const DEFAULT_PERSPECTIVE: &str = "auto_trading";

pub const PERSPECTIVES: [Perspective; 4] = [
    Perspective {
        id: "auto_trading",
        name: "자동매매 관점",
        description: "투자 전략을 자동매매 시스템 관점에서 비판적으로 분석합니다. (Claude와 코드 개발로 구현 가능한 것 기준)",
        focus_area: "코드로 자동화 가능한 부분 (기술적 지표, 규칙 기반 매매, 리스크 관리)",
    },
    Perspective {
        id: "value_investing",
        name: "가치투자 관점",
        description: "워렌 버핏 스타일의 가치투자 관점에서 비판적으로 분석합니다.",
        focus_area: "본질 가치 분석, 안전마진, 장기 보유 관점",
    },
    Perspective {
        id: "day_trading",
        name: "단타 관점",
        description: "데이트레이딩/단기매매 관점에서 비판적으로 분석합니다.",
        focus_area: "진입/청산 타이밍, 손절 기준, 리스크 관리",
    },
    Perspective {
        id: "psychology",
        name: "심리 분석 관점",
        description: "투자 심리학 관점에서 비판적으로 분석합니다.",
        focus_area: "심리적 함정 극복, 행동경제학 적용",
    },
];

impl Perspective {
    pub fn is_auto_trading(&self) -> bool {
        self.id == DEFAULT_PERSPECTIVE
    }
}

/// Look up a perspective. Unknown IDs resolve to the default.
pub fn get_perspective(id: &str) -> &'static Perspective {
    let id = id.trim();
    PERSPECTIVES
        .iter()
        .find(|p| p.id == id)
        .unwrap_or(&PERSPECTIVES[0])
}

pub fn all_perspectives() -> Vec<PerspectiveInfo> {
    PERSPECTIVES
        .iter()
        .map(|p| PerspectiveInfo {
            id: p.id.to_string(),
            name: p.name.to_string(),
            description: p.description.to_string(),
        })
        .collect()
}
