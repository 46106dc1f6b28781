//! Caption track selection.

use std::collections::BTreeMap;

use crate::ytdlp::{CaptionFormat, YtDlpInfo};

/// Caption file formats we can parse, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionKind {
    Vtt,
    Json3,
}

impl CaptionKind {
    fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "vtt" => Some(CaptionKind::Vtt),
            "json3" => Some(CaptionKind::Json3),
            _ => None,
        }
    }
}

/// The caption track chosen for a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTrack {
    pub language: String,
    pub is_generated: bool,
    pub kind: CaptionKind,
    pub url: String,
}

/// Pick a caption track.
///
/// For each preferred language: manual, then generated. Then any manual track,
/// then any generated track. Auto-translated tracks are never used.
pub fn select_track(info: &YtDlpInfo, languages: &[String]) -> Option<SelectedTrack> {
    for language in languages {
        if let Some(track) = find_in(&info.subtitles, false, |lang| language_matches(lang, language)) {
            return Some(track);
        }
        if let Some(track) =
            find_in(&info.automatic_captions, true, |lang| language_matches(lang, language))
        {
            return Some(track);
        }
    }

    find_in(&info.subtitles, false, |_| true)
        .or_else(|| find_in(&info.automatic_captions, true, |_| true))
}

fn find_in(
    tracks: &BTreeMap<String, Vec<CaptionFormat>>,
    is_generated: bool,
    accept: impl Fn(&str) -> bool,
) -> Option<SelectedTrack> {
    tracks
        .iter()
        .filter(|(lang, _)| accept(lang))
        .find_map(|(lang, formats)| {
            best_format(formats).map(|(kind, url)| SelectedTrack {
                language: lang.clone(),
                is_generated,
                kind,
                url: url.to_string(),
            })
        })
}

fn best_format(formats: &[CaptionFormat]) -> Option<(CaptionKind, &str)> {
    let usable = || {
        formats
            .iter()
            .filter(|f| !f.url.is_empty() && !f.url.contains("tlang="))
    };

    [CaptionKind::Vtt, CaptionKind::Json3].into_iter().find_map(|wanted| {
        usable()
            .find(|f| CaptionKind::from_ext(&f.ext) == Some(wanted))
            .map(|f| (wanted, f.url.as_str()))
    })
}

/// Exact match or regional variant (`en` matches `en-US`).
fn language_matches(track_lang: &str, wanted: &str) -> bool {
    track_lang.eq_ignore_ascii_case(wanted)
        || track_lang
            .to_ascii_lowercase()
            .starts_with(&format!("{}-", wanted.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(ext: &str, url: &str) -> CaptionFormat {
        CaptionFormat {
            ext: ext.into(),
            url: url.into(),
            name: None,
        }
    }

    fn langs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_manual_preferred_over_generated() {
        let mut info = YtDlpInfo::default();
        info.subtitles
            .insert("ko".into(), vec![format("vtt", "https://c/ko-manual.vtt")]);
        info.automatic_captions
            .insert("ko".into(), vec![format("vtt", "https://c/ko-auto.vtt")]);

        let track = select_track(&info, &langs(&["ko", "en"])).unwrap();
        assert_eq!(track.url, "https://c/ko-manual.vtt");
        assert!(!track.is_generated);
    }

    #[test]
    fn test_generated_korean_beats_manual_english() {
        let mut info = YtDlpInfo::default();
        info.subtitles
            .insert("en".into(), vec![format("vtt", "https://c/en.vtt")]);
        info.automatic_captions
            .insert("ko".into(), vec![format("vtt", "https://c/ko-auto.vtt")]);

        let track = select_track(&info, &langs(&["ko", "en"])).unwrap();
        assert_eq!(track.language, "ko");
        assert!(track.is_generated);
    }

    #[test]
    fn test_regional_variant_and_json3() {
        let mut info = YtDlpInfo::default();
        info.subtitles.insert(
            "en-US".into(),
            vec![
                format("srv3", "https://c/en.srv3"),
                format("json3", "https://c/en.json3"),
            ],
        );

        let track = select_track(&info, &langs(&["ko", "en"])).unwrap();
        assert_eq!(track.language, "en-US");
        assert_eq!(track.kind, CaptionKind::Json3);
    }

    #[test]
    fn test_translated_tracks_ignored() {
        let mut info = YtDlpInfo::default();
        info.automatic_captions.insert(
            "ko".into(),
            vec![format("vtt", "https://c/timedtext?lang=ja&tlang=ko&fmt=vtt")],
        );
        info.automatic_captions
            .insert("ja".into(), vec![format("vtt", "https://c/timedtext?lang=ja&fmt=vtt")]);

        let track = select_track(&info, &langs(&["ko", "en"])).unwrap();
        assert_eq!(track.language, "ja");
    }

    #[test]
    fn test_any_manual_before_any_generated() {
        let mut info = YtDlpInfo::default();
        info.automatic_captions
            .insert("de".into(), vec![format("vtt", "https://c/de-auto.vtt")]);
        info.subtitles
            .insert("fr".into(), vec![format("vtt", "https://c/fr.vtt")]);

        let track = select_track(&info, &langs(&["ko"])).unwrap();
        assert_eq!(track.language, "fr");
    }

    #[test]
    fn test_no_tracks() {
        assert!(select_track(&YtDlpInfo::default(), &langs(&["ko"])).is_none());
    }
}
