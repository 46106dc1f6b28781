//! Stage 1: transcript analysis and topic suitability.

use super::{fill, truncate_chars};

/// Appended when the transcript was cut to fit the prompt.
pub const TRUNCATION_NOTE: &str = "... (자막이 너무 길어 일부가 생략되었습니다)";

const TEMPLATE: &str = r#"당신은 투자 유튜브 콘텐츠 분석 전문가입니다.
아래 유튜브 영상 자막을 분석하고, 이 영상이 비판적 분석 콘텐츠의 소재로 적합한지 판단해주세요.

[자막 내용]
{transcript}

[출력 형식 - 반드시 JSON 형식으로 응답]
{
    "video_analysis": {
        "summary": "영상 요약 (3~5줄)",
        "key_message": "핵심 메시지 (한 문장)",
        "key_points": ["키포인트1", "키포인트2", "키포인트3"],
        "quotes": [
            {"text": "자막에 실제로 나온 인용할 만한 대사", "speaker": "발언자"}
        ],
        "people": [
            {"name": "이름", "role": "역할", "related_links": []}
        ],
        "investment_strategy": "영상에서 소개하는 거장의 투자 전략 (구체적으로)",
        "source_tracking": [
            {
                "quote": "인용문",
                "source_title": "원본 출처 제목 (책 제목, 인터뷰명, 주주서한 연도 등)",
                "source_type": "책|인터뷰 영상|기사|주주서한|논문|SNS|보고서|출처 확인 필요",
                "source_url": "확실한 URL 또는 null",
                "reliability": 3,
                "search_keywords": ["검색 키워드1", "검색 키워드2"]
            }
        ],
        "video_structure": [
            {"order": 1, "element": "구성 요소 (예: 후킹 질문)", "type": "후킹|권위|사례|데이터|결론", "description": "해당 구간 설명"}
        ],
        "structure_summary": "영상 전개 방식 한 줄 요약"
    },
    "suitability_analysis": {
        "feasibility_issue": {"exists": true, "content": "일반인이 실행하기 어려운 지점"},
        "hidden_premise": {"exists": true, "content": "전략이 암묵적으로 가정하는 조건"},
        "criticism_point": {"exists": true, "content": "논리적으로 비판할 수 있는 지점"},
        "target_empathy": {"level": "높음|중간|낮음", "reason": "직장인/대학생/부업러가 공감할 이유"},
        "source_availability": {"level": "높음|중간|낮음", "reason": "비판 근거 출처를 찾을 수 있는 정도"},
        "suitability_score": 3,
        "judgment": "적합|보류|부적합",
        "usage_recommendation": "메인 소재|보조 소재|참고만",
        "unsuitable_reason": "부적합일 때만 사유, 아니면 null"
    }
}

[주의사항]
1. 반드시 유효한 JSON 형식으로만 응답하세요.
2. 다른 텍스트 없이 JSON만 출력하세요.
3. 한국어로 분석해주세요.
4. 인용 대사는 자막에서 실제로 나온 문장을 그대로 사용하세요.
5. 등장 인물이 없으면 빈 배열로 응답하세요.
6. 출처를 확신할 수 없으면 source_type을 "출처 확인 필요"로, source_url을 null로 두세요.
7. suitability_score는 1~5 정수입니다. 실현 가능성 이슈, 숨겨진 전제, 비판 포인트가 모두 없으면 "부적합"으로 판단하세요.
8. 투자와 무관한 영상, 단순 광고, 뉴스 속보는 "부적합"으로 판단하고 unsuitable_reason에 사유를 적으세요.
"#;

/// Build the stage 1 prompt, cutting the transcript to `max_chars`.
pub fn build_video_prompt(transcript: &str, max_chars: usize) -> String {
    let transcript = match truncate_chars(transcript, max_chars) {
        (head, true) => format!("{}{}", head, TRUNCATION_NOTE),
        (all, false) => all.to_string(),
    };
    fill(TEMPLATE, &[("transcript", &transcript)])
}
