// src/normalize.rs
//! Free-text and timestamp normalization for records on their way to the
//! API server.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Marker token the alert feed appends to region names ("entire area").
const ENTIRE_MARKER: &str = "전체";

/// Normalize a single receiving-region name.
///
/// The feed frequently doubles adjacent tokens ("서울특별시 서울특별시 종로구")
/// and suffixes the 전체 marker. Collapse each run of repeated adjacent
/// whitespace-delimited tokens to one occurrence, drop the marker, and
/// re-collapse whitespace. Idempotent.
pub fn normalize_location(raw: &str) -> String {
    let mut tokens: Vec<&str> = Vec::new();
    for tok in raw.split_whitespace() {
        if tokens.last() != Some(&tok) {
            tokens.push(tok);
        }
    }
    let collapsed = tokens.join(" ").replace(ENTIRE_MARKER, "");
    collapsed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Convert the alert feed's `CRT_DT` stamp (`YYYY/MM/DD HH:MM:SS`) into
/// ISO-8601 without sub-seconds, the shape the API server stores.
pub fn disaster_generated_at(crt_dt: &str) -> Result<String> {
    let dt = NaiveDateTime::parse_from_str(crt_dt, "%Y/%m/%d %H:%M:%S")
        .with_context(|| format!("unparsable CRT_DT {crt_dt:?}"))?;
    Ok(format_published_at(&dt))
}

/// Anchor a relative news stamp (`MM-DD HH:MM`, no year) to the given year.
pub fn news_published_at(created_at: &str, year: i32) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&format!("{year}-{created_at}"), "%Y-%m-%d %H:%M")
        .with_context(|| format!("unparsable article time {created_at:?}"))
}

/// ISO-8601 without sub-seconds, matching the API server's `publishedAt`.
pub fn format_published_at(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Parse the API server's `publishedAt` back into a comparable timestamp.
pub fn parse_published_at(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .with_context(|| format!("unparsable publishedAt {s:?}"))
}

/// Today in the alert feed's `crtDt` query format.
pub fn crt_dt_for(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubled_tokens_collapse() {
        assert_eq!(normalize_location("Seoul Seoul Gu"), "Seoul Gu");
        assert_eq!(
            normalize_location("서울특별시 서울특별시 종로구"),
            "서울특별시 종로구"
        );
    }

    #[test]
    fn entire_marker_is_stripped() {
        assert_eq!(normalize_location("Gangnam-gu Gangnam-gu 전체"), "Gangnam-gu");
        assert_eq!(normalize_location("경기도 전체"), "경기도");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["Seoul Seoul", "Seoul", "Gangnam-gu Gangnam-gu 전체", "  a  a  b "] {
            let once = normalize_location(raw);
            assert_eq!(normalize_location(&once), once);
        }
    }

    #[test]
    fn crt_dt_converts_to_iso() {
        assert_eq!(
            disaster_generated_at("2024/03/15 14:30:00").unwrap(),
            "2024-03-15T14:30:00"
        );
        assert!(disaster_generated_at("yesterday").is_err());
    }

    #[test]
    fn relative_news_stamp_anchors_to_year() {
        let dt = news_published_at("03-15 14:30", 2024).unwrap();
        assert_eq!(format_published_at(&dt), "2024-03-15T14:30:00");
    }

    #[test]
    fn published_at_round_trips() {
        let dt = parse_published_at("2024-12-31T23:59:00").unwrap();
        assert_eq!(format_published_at(&dt), "2024-12-31T23:59:00");
    }
}
