//! Cited-source verification strategies.
//!
//! Each strategy walks a list of queries and returns the first acceptable hit,
//! or a search-page fallback URL with `found = false`. Queries are memoised so
//! a verifier never sends the same search twice; create one per analysis run.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use yta_models::SourceType;

use crate::names::{english_name, translate_title};
use crate::{metrics, SearchHit, WebSearch};

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(19|20)\d{2}").expect("valid year regex"));

/// Outcome of a source lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceLookup {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Hit URL, or a search-page fallback when not found
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    pub search_query: String,
}

impl SourceLookup {
    fn hit(query: &str, hit: SearchHit) -> Self {
        Self {
            found: true,
            title: Some(hit.title),
            url: Some(hit.url),
            snippet: Some(hit.snippet),
            search_query: query.to_string(),
        }
    }

    fn miss(query: &str) -> Self {
        Self {
            search_query: query.to_string(),
            ..Default::default()
        }
    }

    fn fallback(query: &str, url: String) -> Self {
        Self {
            url: Some(url),
            ..Self::miss(query)
        }
    }

    fn url_contains_any(&self, needles: &[&str]) -> bool {
        self.url
            .as_deref()
            .is_some_and(|url| needles.iter().any(|n| url.contains(n)))
    }
}

fn google_search_url(term: &str) -> String {
    format!("https://www.google.com/search?q={}", urlencoding::encode(term))
}

fn youtube_search_url(term: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(term)
    )
}

fn kyobo_search_url(term: &str) -> String {
    format!(
        "https://search.kyobobook.co.kr/search?keyword={}",
        urlencoding::encode(term)
    )
}

/// Book titles often carry a series prefix ("시리즈: 제목").
fn clean_book_title(title: &str) -> &str {
    match title.rsplit_once(':') {
        Some((_, rest)) => rest.trim(),
        None => title.trim(),
    }
}

fn first_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct SourceVerifier {
    search: Arc<dyn WebSearch>,
    memo: Mutex<HashMap<(String, u32), Vec<SearchHit>>>,
}

impl SourceVerifier {
    pub fn new(search: Arc<dyn WebSearch>) -> Self {
        Self {
            search,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.search.is_enabled()
    }

    /// Run a search once per distinct `(query, max_results)`.
    ///
    /// Failures are logged and memoised as empty so a flaky query is not retried
    /// within the same run.
    pub async fn search_hits(&self, query: &str, max_results: u32) -> Vec<SearchHit> {
        let key = (query.to_string(), max_results);
        if let Some(hits) = self.memo.lock().await.get(&key) {
            debug!(query, "Search memo hit");
            return hits.clone();
        }

        let hits = match self.search.search(query, max_results).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(query, error = %e, "Web search failed");
                Vec::new()
            }
        };

        self.memo.lock().await.insert(key, hits.clone());
        hits
    }

    /// First hit for a query.
    pub async fn search_source(&self, query: &str) -> SourceLookup {
        match self.search_hits(query, 1).await.into_iter().next() {
            Some(hit) => SourceLookup::hit(query, hit),
            None => SourceLookup::miss(query),
        }
    }

    /// Search each query in order; return the first found lookup `accept` approves.
    async fn first_accepted(
        &self,
        queries: &[String],
        accept: impl Fn(&SourceLookup) -> bool,
    ) -> Option<SourceLookup> {
        for query in queries {
            let lookup = self.search_source(query).await;
            if lookup.found && accept(&lookup) {
                return Some(lookup);
            }
        }
        None
    }

    /// Search a list of queries independently.
    pub async fn search_many(&self, queries: &[String]) -> Vec<SourceLookup> {
        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            results.push(self.search_source(query).await);
        }
        results
    }

    /// Locate a book, preferring Kyobo, then Yes24 and Aladin.
    pub async fn search_book(&self, title: &str) -> SourceLookup {
        let title = clean_book_title(title);

        let kyobo = [
            format!("{} site:kyobobook.co.kr", title),
            format!("{} 교보문고", title),
        ];
        let lookup = match self
            .first_accepted(&kyobo, |l| l.url_contains_any(&["kyobobook"]))
            .await
        {
            Some(lookup) => Some(lookup),
            None => {
                let general = [
                    format!("{} site:yes24.com", title),
                    format!("{} site:aladin.co.kr", title),
                    format!("{} 책", title),
                ];
                self.first_accepted(&general, |_| true).await
            }
        };

        let lookup = lookup.unwrap_or_else(|| SourceLookup::fallback(title, kyobo_search_url(title)));
        metrics::record_verification("book", lookup.found);
        lookup
    }

    /// Locate a video clip of a person speaking, preferring YouTube.
    pub async fn search_interview_clip(
        &self,
        person: &str,
        video_title: &str,
        quote: &str,
    ) -> SourceLookup {
        let person = person.trim();
        let international = english_name(person);
        let search_person = international.unwrap_or(person);
        let search_title = translate_title(video_title);

        let mut queries: Vec<String> = Vec::new();
        if international.is_some() {
            if !video_title.is_empty() {
                let year = YEAR_PATTERN.find(video_title).map(|m| m.as_str());
                queries.push(format!("{} {} site:youtube.com", search_person, search_title));
                match year {
                    Some(year) => {
                        queries.push(format!("{} interview {} site:youtube.com", search_person, year));
                        queries.push(format!("{} {} site:youtube.com", search_person, year));
                    }
                    None => queries.push(format!("{} interview site:youtube.com", search_person)),
                }
            }
            queries.push(format!("{} interview site:youtube.com", search_person));
            queries.push(format!("{} speech site:youtube.com", search_person));
            queries.push(format!("{} CNBC site:youtube.com", search_person));
        } else {
            if quote.chars().count() > 10 {
                queries.push(format!("{} {} site:youtube.com", person, first_chars(quote, 30)));
            }
            if !video_title.is_empty() {
                queries.push(format!("{} {} site:youtube.com", person, video_title));
                queries.push(format!("{} site:youtube.com", video_title));
            }
            queries.push(format!("{} 인터뷰 site:youtube.com", person));
            queries.push(format!("{} interview site:youtube.com", person));
            queries.push(format!("{} 영상", person));
        }

        debug!(person, queries = ?&queries[..queries.len().min(3)], "Interview clip queries");

        if let Some(lookup) = self
            .first_accepted(&queries, |l| l.url_contains_any(&["youtube.com", "youtu.be"]))
            .await
        {
            metrics::record_verification("interview", true);
            return lookup;
        }

        let news = [
            if video_title.is_empty() {
                format!("{} 인터뷰 기사", search_person)
            } else {
                format!("{} {} 기사", search_person, search_title)
            },
            format!("{} 발언", search_person),
        ];
        if let Some(lookup) = self.first_accepted(&news, |_| true).await {
            metrics::record_verification("interview", true);
            return lookup;
        }

        let term = if video_title.is_empty() {
            format!("{} interview", search_person)
        } else {
            format!("{} {}", search_person, search_title)
        };
        metrics::record_verification("interview", false);
        SourceLookup::fallback(&term, youtube_search_url(&term))
    }

    /// Locate evidence for a claim using type-specific query families.
    pub async fn search_evidence(&self, evidence: &str, source_type: &str) -> SourceLookup {
        let e = evidence;
        let queries: Vec<String> = match source_type.trim() {
            "기사" => vec![
                format!("{} 기사", e),
                format!("{} 뉴스", e),
                format!("{} site:hankyung.com OR site:chosun.com OR site:joongang.co.kr", e),
            ],
            "논문" => vec![
                format!("{} 논문", e),
                format!("{} 연구", e),
                format!("{} site:riss.kr OR site:scholar.google.com", e),
            ],
            "보고서" => vec![
                format!("{} 보고서", e),
                format!("{} site:fss.or.kr OR site:krx.co.kr OR site:bok.or.kr", e),
                format!("{} 리포트", e),
            ],
            "영상" => vec![format!("{} site:youtube.com", e), format!("{} 영상", e)],
            _ => vec![e.to_string(), format!("{} 출처", e)],
        };

        let lookup = self
            .first_accepted(&queries, |_| true)
            .await
            .unwrap_or_else(|| SourceLookup::fallback(e, google_search_url(e)));
        metrics::record_verification("evidence", lookup.found);
        lookup
    }

    /// Locate a named source according to its declared type.
    pub async fn search_by_type(&self, name: &str, source_type: &str, context: &str) -> SourceLookup {
        let name = name.trim();
        if name.is_empty() || name == "-" {
            return SourceLookup::miss("");
        }

        let kind = SourceType::parse(source_type);
        let n = name;
        let mut queries: Vec<String> = match kind {
            SourceType::Book => return self.search_book(name).await,
            SourceType::Paper => vec![
                format!("{} 논문", n),
                format!("{} site:riss.kr", n),
                format!("{} site:scholar.google.com", n),
                format!("{} 연구", n),
            ],
            SourceType::Report => vec![
                format!("{} 보고서 원문", n),
                format!("{} site:fss.or.kr OR site:krx.co.kr", n),
                format!("{} 보고서", n),
                format!("{} 리포트", n),
            ],
            SourceType::Article => vec![
                format!("{} 기사", n),
                format!("{} 뉴스", n),
                format!("{} site:hankyung.com OR site:chosun.com", n),
            ],
            SourceType::Video | SourceType::Interview => vec![
                format!("{} site:youtube.com", n),
                format!("{} 영상", n),
                format!("{} 인터뷰", n),
            ],
            _ => vec![n.to_string(), format!("{} 출처", n), format!("{} 원문", n)],
        };

        if !context.is_empty() {
            queries.insert(0, format!("{} {}", n, first_chars(context, 30)));
        }

        if let Some(lookup) = self.first_accepted(&queries, |_| true).await {
            metrics::record_verification("typed", true);
            return lookup;
        }

        let fallback = if kind.is_video() {
            youtube_search_url(n)
        } else {
            google_search_url(n)
        };
        metrics::record_verification("typed", false);
        SourceLookup::fallback(n, fallback)
    }

    /// Resolve a link for a cited source whose URL is missing.
    ///
    /// Returns `None` when there is no source name or a URL is already present.
    pub async fn verify_link(&self, source: &str, url: Option<&str>) -> Option<(String, bool)> {
        let source = source.trim();
        if source.is_empty() {
            return None;
        }
        if url.is_some_and(|u| !u.trim().is_empty() && u.trim() != "null") {
            return None;
        }

        let lookup = self.search_source(source).await;
        metrics::record_verification("link", lookup.found);
        match (lookup.found, lookup.url) {
            (true, Some(url)) => Some((url, true)),
            _ => Some((
                format!("https://www.google.com/search?q={}", source.replace(' ', "+")),
                false,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchResult;
    use async_trait::async_trait;

    /// Returns a canned hit per exact query and records every query sent.
    #[derive(Default)]
    struct FakeSearch {
        results: HashMap<String, SearchHit>,
        calls: std::sync::Mutex<Vec<String>>,
    }

    impl FakeSearch {
        fn with(mut self, query: &str, url: &str) -> Self {
            self.results.insert(
                query.to_string(),
                SearchHit {
                    title: format!("title for {}", query),
                    url: url.to_string(),
                    snippet: "snippet".to_string(),
                },
            );
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WebSearch for FakeSearch {
        async fn search(&self, query: &str, _max_results: u32) -> SearchResult<Vec<SearchHit>> {
            self.calls.lock().unwrap().push(query.to_string());
            Ok(self.results.get(query).cloned().into_iter().collect())
        }
    }

    fn verifier(search: FakeSearch) -> (SourceVerifier, Arc<FakeSearch>) {
        let search = Arc::new(search);
        (SourceVerifier::new(search.clone()), search)
    }

    #[tokio::test]
    async fn test_book_requires_kyobo_url_for_kyobo_queries() {
        let (v, search) = verifier(
            FakeSearch::default()
                .with("오래된 버핏 교보문고", "https://blog.example.com/post")
                .with("오래된 버핏 site:aladin.co.kr", "https://www.aladin.co.kr/p/1"),
        );

        let lookup = v.search_book("더 클래식 시리즈: 오래된 버핏").await;
        assert!(lookup.found);
        assert_eq!(lookup.url.as_deref(), Some("https://www.aladin.co.kr/p/1"));
        assert_eq!(
            search.calls(),
            vec![
                "오래된 버핏 site:kyobobook.co.kr",
                "오래된 버핏 교보문고",
                "오래된 버핏 site:yes24.com",
                "오래된 버핏 site:aladin.co.kr",
            ]
        );
    }

    #[tokio::test]
    async fn test_book_fallback() {
        let (v, _) = verifier(FakeSearch::default());
        let lookup = v.search_book("현명한 투자자").await;
        assert!(!lookup.found);
        assert_eq!(
            lookup.url.as_deref(),
            Some("https://search.kyobobook.co.kr/search?keyword=%ED%98%84%EB%AA%85%ED%95%9C%20%ED%88%AC%EC%9E%90%EC%9E%90")
        );
        assert_eq!(lookup.search_query, "현명한 투자자");
    }

    #[tokio::test]
    async fn test_interview_international_uses_english_and_year() {
        let (v, search) = verifier(FakeSearch::default().with(
            "Warren Buffett interview 2008 site:youtube.com",
            "https://www.youtube.com/watch?v=abc",
        ));

        let lookup = v
            .search_interview_clip("워렌 버핏", "2008 주주총회", "한국어 인용문은 쓰지 않는다")
            .await;

        assert!(lookup.found);
        assert_eq!(
            search.calls(),
            vec![
                "Warren Buffett 2008 shareholders meeting site:youtube.com",
                "Warren Buffett interview 2008 site:youtube.com",
            ]
        );
    }

    #[tokio::test]
    async fn test_interview_korean_quote_first_and_youtube_only() {
        let (v, search) = verifier(
            FakeSearch::default()
                .with("홍길동 주식은 타이밍이 아니라 시간입니다 site:youtube.com", "https://news.example.com/a")
                .with("홍길동 인터뷰 site:youtube.com", "https://youtu.be/xyz"),
        );

        let lookup = v
            .search_interview_clip("홍길동", "", "주식은 타이밍이 아니라 시간입니다")
            .await;

        assert_eq!(lookup.url.as_deref(), Some("https://youtu.be/xyz"));
        assert_eq!(search.calls()[0], "홍길동 주식은 타이밍이 아니라 시간입니다 site:youtube.com");
    }

    #[tokio::test]
    async fn test_interview_news_then_fallback() {
        let (v, _) = verifier(
            FakeSearch::default().with("Charlie Munger 발언", "https://www.hankyung.com/article/1"),
        );
        let lookup = v.search_interview_clip("찰리 멍거", "", "").await;
        assert_eq!(lookup.url.as_deref(), Some("https://www.hankyung.com/article/1"));

        let (v, _) = verifier(FakeSearch::default());
        let lookup = v.search_interview_clip("찰리 멍거", "", "").await;
        assert!(!lookup.found);
        assert_eq!(
            lookup.url.as_deref(),
            Some("https://www.youtube.com/results?search_query=Charlie%20Munger%20interview")
        );
    }

    #[tokio::test]
    async fn test_evidence_query_families() {
        let (v, search) = verifier(FakeSearch::default());
        let lookup = v.search_evidence("개인투자자 손실 비율", "보고서").await;

        assert!(!lookup.found);
        assert!(lookup.url.unwrap().starts_with("https://www.google.com/search?q="));
        assert_eq!(
            search.calls(),
            vec![
                "개인투자자 손실 비율 보고서",
                "개인투자자 손실 비율 site:fss.or.kr OR site:krx.co.kr OR site:bok.or.kr",
                "개인투자자 손실 비율 리포트",
            ]
        );
    }

    #[tokio::test]
    async fn test_by_type_skips_placeholder_names() {
        let (v, search) = verifier(FakeSearch::default());
        let lookup = v.search_by_type("-", "기사", "").await;
        assert!(!lookup.found);
        assert!(lookup.url.is_none());
        assert!(search.calls().is_empty());
    }

    #[tokio::test]
    async fn test_by_type_context_first_and_video_fallback() {
        let (v, search) = verifier(FakeSearch::default());
        let lookup = v.search_by_type("버핏 CNBC", "인터뷰 영상", "시장은 단기적으로 투표 기계").await;

        assert_eq!(search.calls()[0], "버핏 CNBC 시장은 단기적으로 투표 기계");
        assert!(lookup
            .url
            .unwrap()
            .starts_with("https://www.youtube.com/results?search_query="));
    }

    #[tokio::test]
    async fn test_by_type_book_delegates() {
        let (v, search) = verifier(
            FakeSearch::default().with("스노볼 site:kyobobook.co.kr", "https://product.kyobobook.co.kr/1"),
        );
        let lookup = v.search_by_type("스노볼", "도서", "인용문").await;
        assert!(lookup.found);
        assert_eq!(search.calls(), vec!["스노볼 site:kyobobook.co.kr"]);
    }

    #[tokio::test]
    async fn test_verify_link() {
        let (v, search) = verifier(
            FakeSearch::default().with("버크셔 주주서한 2008", "https://www.berkshirehathaway.com/letters/2008ltr.pdf"),
        );

        assert_eq!(v.verify_link("버크셔 주주서한 2008", Some("https://given")).await, None);
        assert_eq!(v.verify_link("", None).await, None);
        assert_eq!(
            v.verify_link("버크셔 주주서한 2008", Some("null")).await,
            Some((
                "https://www.berkshirehathaway.com/letters/2008ltr.pdf".to_string(),
                true
            ))
        );
        assert_eq!(
            v.verify_link("없는 출처", None).await,
            Some(("https://www.google.com/search?q=없는+출처".to_string(), false))
        );
        assert_eq!(search.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_queries_are_memoised() {
        let (v, search) = verifier(FakeSearch::default());
        v.search_source("same query").await;
        v.search_source("same query").await;
        v.search_hits("same query", 3).await;
        assert_eq!(search.calls().len(), 2);
    }
}
