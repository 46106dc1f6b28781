//! Source classification and search keyword helpers.

use yta_models::SourceType;

const BOOK_URLS: &[&str] = &["amazon.com/dp", "goodreads.com", "yes24.com", "kyobobook", "aladin.co.kr"];
const BOOK_TITLES: &[&str] = &["책", "book", "저서", "출판"];
const INTERVIEW_URLS: &[&str] = &["youtube.com", "youtu.be", "vimeo.com", "ted.com"];
const INTERVIEW_TITLES: &[&str] = &["인터뷰", "interview", "대담", "강연"];
const LETTER_TITLES: &[&str] = &["주주서한", "shareholder letter", "annual letter", "berkshire"];
const PAPER_URLS: &[&str] = &["arxiv.org", "scholar.google", "ssrn.com", "doi.org", "pubmed"];
const PAPER_TITLES: &[&str] = &["논문", "paper", "study", "research"];
const SNS_URLS: &[&str] = &["twitter.com", "x.com", "facebook.com", "linkedin.com", "instagram.com"];
const REPORT_TITLES: &[&str] = &["보고서", "report", "리포트", "분석"];
const ARTICLE_URLS: &[&str] = &["news", "article", "blog", "post", ".com/", ".co.kr/"];

const FAMOUS_INVESTORS: &[&str] = &[
    "워렌 버핏",
    "Warren Buffett",
    "찰리 멍거",
    "Charlie Munger",
    "피터 린치",
    "Peter Lynch",
    "레이 달리오",
    "Ray Dalio",
    "조지 소로스",
    "George Soros",
    "벤저민 그레이엄",
    "Benjamin Graham",
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a source by its URL and title.
pub fn classify_source_type(url: &str, title: &str) -> SourceType {
    let url = url.to_lowercase();
    let title = title.to_lowercase();

    if contains_any(&url, BOOK_URLS) || contains_any(&title, BOOK_TITLES) {
        SourceType::Book
    } else if contains_any(&url, INTERVIEW_URLS) || contains_any(&title, INTERVIEW_TITLES) {
        SourceType::Interview
    } else if contains_any(&title, LETTER_TITLES) {
        SourceType::ShareholderLetter
    } else if contains_any(&url, PAPER_URLS) || contains_any(&title, PAPER_TITLES) {
        SourceType::Paper
    } else if contains_any(&url, SNS_URLS) {
        SourceType::Sns
    } else if contains_any(&title, REPORT_TITLES) {
        SourceType::Report
    } else if contains_any(&url, ARTICLE_URLS) {
        SourceType::Article
    } else {
        SourceType::Unknown
    }
}

/// Search keywords for locating the origin of a quote.
pub fn generate_search_keywords(quote: &str, speaker: &str) -> Vec<String> {
    let mut keywords = Vec::new();

    if !speaker.is_empty() {
        keywords.push(format!("\"{}\"", speaker));
    }

    if quote.chars().count() < 50 {
        keywords.push(format!("\"{}\"", quote));
    } else {
        let words: Vec<&str> = quote.split_whitespace().collect();
        if words.len() > 5 {
            keywords.push(words[..5].join(" "));
        }
    }

    let lowered = quote.to_lowercase();
    keywords.extend(
        FAMOUS_INVESTORS
            .iter()
            .filter(|name| lowered.contains(&name.to_lowercase()))
            .map(|name| name.to_string()),
    );

    keywords
}
