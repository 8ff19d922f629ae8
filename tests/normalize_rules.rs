// tests/normalize_rules.rs
use daepiro_datacollector::normalize::{
    disaster_generated_at, format_published_at, news_published_at, normalize_location,
    parse_published_at,
};

#[test]
fn repeated_region_tokens_collapse_to_one() {
    assert_eq!(normalize_location("Seoul Seoul Gu"), "Seoul Gu");
    assert_eq!(normalize_location("Seoul"), "Seoul");
    assert_eq!(
        normalize_location("서울특별시 서울특별시 서울특별시 종로구"),
        "서울특별시 종로구"
    );
}

#[test]
fn entire_marker_and_padding_are_removed() {
    assert_eq!(normalize_location("Gangnam-gu Gangnam-gu 전체"), "Gangnam-gu");
    assert_eq!(normalize_location(" 경기도 전체 "), "경기도");
}

#[test]
fn location_normalization_is_idempotent() {
    let samples = [
        "Seoul Seoul",
        "Gangnam-gu Gangnam-gu 전체",
        "서울특별시 중구",
        "",
    ];
    for raw in samples {
        let once = normalize_location(raw);
        let twice = normalize_location(&once);
        assert_eq!(once, twice, "not idempotent for {raw:?}");
    }
}

#[test]
fn alert_timestamps_become_iso8601() {
    assert_eq!(
        disaster_generated_at("2024/03/15 14:30:00").unwrap(),
        "2024-03-15T14:30:00"
    );
}

#[test]
fn relative_news_stamps_anchor_to_the_given_year() {
    let dt = news_published_at("03-15 14:30", 2024).unwrap();
    assert_eq!(format_published_at(&dt), "2024-03-15T14:30:00");

    // round-trips through the API server's representation
    let back = parse_published_at("2024-03-15T14:30:00").unwrap();
    assert_eq!(back, dt);
}

#[test]
fn garbage_timestamps_are_errors_not_defaults() {
    assert!(disaster_generated_at("2024-03-15 14:30:00").is_err());
    assert!(news_published_at("어제 14:30", 2024).is_err());
    assert!(parse_published_at("2024/03/15").is_err());
}
