//! Attach verified links to sources cited in stage results.
//!
//! Only entries whose link is missing (absent, blank or the literal `"null"`)
//! are searched. Existing links are left as the model produced them.

use yta_models::{AdditionalAnalysis, CriticalAnalysis, SourceTracking};
use yta_search::SourceVerifier;

use crate::metrics;

/// Sources the model could not attribute are not searched.
const UNKNOWN_SOURCE: &str = "출처 확인 필요";

fn needs_link(url: Option<&str>) -> bool {
    match url.map(str::trim) {
        None => true,
        Some(url) => url.is_empty() || url == "null",
    }
}

/// Resolve missing links in stage 1 source tracking by declared source type.
pub async fn verify_source_tracking(verifier: &SourceVerifier, items: &mut [SourceTracking]) {
    for item in items.iter_mut() {
        let title = item.source_title.trim();
        if title.is_empty() || title == UNKNOWN_SOURCE || !needs_link(item.source_url.as_deref()) {
            continue;
        }

        let lookup = verifier
            .search_by_type(title, &item.source_type, &item.quote)
            .await;
        if let Some(url) = lookup.url {
            item.source_url = Some(url);
            item.verified = Some(lookup.found);
            metrics::record_link("source_tracking", lookup.found);
        }
    }
}

/// Resolve missing links in hidden premises, realistic contradictions and
/// every source pair of the source-based contradictions.
pub async fn verify_critical(verifier: &SourceVerifier, critical: &mut CriticalAnalysis) {
    for premise in critical.hidden_premises.iter_mut() {
        let resolved = verifier
            .verify_link(&premise.source, premise.source_url.as_deref())
            .await;
        if let Some((url, verified)) = resolved {
            premise.source_url = Some(url);
            premise.verified = Some(verified);
            metrics::record_link("hidden_premises", verified);
        }
    }

    for contradiction in critical.realistic_contradictions.iter_mut() {
        let resolved = verifier
            .verify_link(&contradiction.source, contradiction.source_url.as_deref())
            .await;
        if let Some((url, verified)) = resolved {
            contradiction.source_url = Some(url);
            contradiction.verified = Some(verified);
            metrics::record_link("realistic_contradictions", verified);
        }
    }

    for item in critical.source_based_contradictions.iter_mut() {
        let pairs = [
            (
                &item.original_source,
                &mut item.original_source_url,
                &mut item.original_source_verified,
            ),
            (
                &item.counterexample_source,
                &mut item.counterexample_source_url,
                &mut item.counterexample_source_verified,
            ),
            (
                &item.hidden_condition_source,
                &mut item.hidden_condition_source_url,
                &mut item.hidden_condition_source_verified,
            ),
        ];
        for (source, url, verified_flag) in pairs {
            let resolved = verifier.verify_link(source, url.as_deref()).await;
            if let Some((link, verified)) = resolved {
                *url = Some(link);
                *verified_flag = Some(verified);
                metrics::record_link("source_based_contradictions", verified);
            }
        }
    }
}

/// Resolve missing links in interview clips, evidence sources and the bonus tip.
pub async fn verify_additional(verifier: &SourceVerifier, additional: &mut AdditionalAnalysis) {
    let sources = &mut additional.video_sources;

    for clip in sources.interview_clips.iter_mut() {
        if clip.person.trim().is_empty() || !needs_link(clip.link.as_deref()) {
            continue;
        }
        let lookup = verifier
            .search_interview_clip(&clip.person, &clip.video_title, &clip.quote)
            .await;
        if let Some(url) = lookup.url {
            clip.link = Some(url);
            clip.verified = Some(lookup.found);
            metrics::record_link("interview_clips", lookup.found);
        }
    }

    for evidence in sources.evidence_sources.iter_mut() {
        if evidence.evidence.trim().is_empty() || !needs_link(evidence.link.as_deref()) {
            continue;
        }
        let lookup = verifier
            .search_evidence(&evidence.evidence, &evidence.source_type)
            .await;
        if let Some(url) = lookup.url {
            evidence.link = Some(url);
            evidence.verified = Some(lookup.found);
            metrics::record_link("evidence_sources", lookup.found);
        }
    }

    if let Some(tip) = additional.bonus_tip.as_mut() {
        if needs_link(tip.source_url.as_deref()) {
            let lookup = verifier.search_by_type(&tip.source, "", &tip.topic).await;
            if let Some(url) = lookup.url {
                tip.source_url = Some(url);
                tip.verified = Some(lookup.found);
                metrics::record_link("bonus_tip", lookup.found);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use yta_models::{BonusTip, EvidenceSource, HiddenPremise, InterviewClip, SourceBasedContradiction};
    use yta_search::{SearchHit, SearchResult, WebSearch};

    /// Answers exact queries from a table.
    struct TableSearch(HashMap<String, String>);

    #[async_trait]
    impl WebSearch for TableSearch {
        async fn search(&self, query: &str, _max_results: u32) -> SearchResult<Vec<SearchHit>> {
            Ok(self
                .0
                .get(query)
                .map(|url| {
                    vec![SearchHit {
                        title: query.to_string(),
                        url: url.clone(),
                        snippet: String::new(),
                    }]
                })
                .unwrap_or_default())
        }
    }

    fn verifier(entries: &[(&str, &str)]) -> SourceVerifier {
        let table = entries
            .iter()
            .map(|(q, u)| (q.to_string(), u.to_string()))
            .collect();
        SourceVerifier::new(Arc::new(TableSearch(table)))
    }

    #[test]
    fn test_needs_link() {
        assert!(needs_link(None));
        assert!(needs_link(Some(" ")));
        assert!(needs_link(Some("null")));
        assert!(!needs_link(Some("https://example.com")));
    }

    #[tokio::test]
    async fn test_source_tracking_skips_unknown_and_linked() {
        let verifier = verifier(&[("현명한 투자자 site:kyobobook.co.kr", "https://kyobobook.co.kr/1")]);
        let mut items = vec![
            SourceTracking {
                source_title: "현명한 투자자".into(),
                source_type: "책".into(),
                ..Default::default()
            },
            SourceTracking {
                source_title: UNKNOWN_SOURCE.into(),
                ..Default::default()
            },
            SourceTracking {
                source_title: "주주서한".into(),
                source_url: Some("https://berkshire.com/letters".into()),
                ..Default::default()
            },
        ];

        verify_source_tracking(&verifier, &mut items).await;

        assert_eq!(items[0].source_url.as_deref(), Some("https://kyobobook.co.kr/1"));
        assert_eq!(items[0].verified, Some(true));
        assert_eq!(items[1].source_url, None);
        assert_eq!(items[2].verified, None);
    }

    #[tokio::test]
    async fn test_critical_links_and_pairs() {
        let verifier = verifier(&[("달바 보고서", "https://dalbar.com/qaib")]);
        let mut critical = CriticalAnalysis {
            hidden_premises: vec![HiddenPremise {
                premise: "p".into(),
                source: "달바 보고서".into(),
                source_url: Some("null".into()),
                ..Default::default()
            }],
            source_based_contradictions: vec![SourceBasedContradiction {
                original_source: "버크셔 주주서한 1987".into(),
                original_source_url: Some("https://berkshire.com/1987".into()),
                counterexample_source: "달바 보고서".into(),
                hidden_condition_source: String::new(),
                ..Default::default()
            }],
            ..Default::default()
        };

        verify_critical(&verifier, &mut critical).await;

        let premise = &critical.hidden_premises[0];
        assert_eq!(premise.source_url.as_deref(), Some("https://dalbar.com/qaib"));
        assert_eq!(premise.verified, Some(true));

        let pair = &critical.source_based_contradictions[0];
        assert_eq!(pair.original_source_verified, None);
        assert_eq!(pair.counterexample_source_url.as_deref(), Some("https://dalbar.com/qaib"));
        assert_eq!(pair.counterexample_source_verified, Some(true));
        assert_eq!(pair.hidden_condition_source_url, None);
    }

    #[tokio::test]
    async fn test_unverified_links_fall_back_to_search_pages() {
        let verifier = verifier(&[]);
        let mut additional = AdditionalAnalysis {
            bonus_tip: Some(BonusTip {
                topic: "ETF 자동적립".into(),
                source: "금융감독원".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        additional.video_sources.interview_clips.push(InterviewClip {
            person: "워렌 버핏".into(),
            ..Default::default()
        });
        additional.video_sources.evidence_sources.push(EvidenceSource {
            evidence: "개인투자자 수익률 통계".into(),
            source_type: "기사".into(),
            ..Default::default()
        });

        verify_additional(&verifier, &mut additional).await;

        let clip = &additional.video_sources.interview_clips[0];
        assert_eq!(clip.verified, Some(false));
        assert!(clip
            .link
            .as_deref()
            .unwrap()
            .starts_with("https://www.youtube.com/results?search_query="));

        let evidence = &additional.video_sources.evidence_sources[0];
        assert_eq!(evidence.verified, Some(false));
        assert!(evidence
            .link
            .as_deref()
            .unwrap()
            .starts_with("https://www.google.com/search?q="));

        let tip = additional.bonus_tip.as_ref().unwrap();
        assert_eq!(tip.verified, Some(false));
        assert!(tip.source_url.is_some());
    }
}
