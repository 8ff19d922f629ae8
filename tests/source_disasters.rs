// tests/source_disasters.rs
use daepiro_datacollector::sources::disaster_api::DisasterApiSource;
use daepiro_datacollector::sources::types::DisasterSource;

const FEED_JSON: &str = include_str!("fixtures/disaster_api.json");

#[tokio::test]
async fn fixture_page_parses_all_alerts() {
    let source = DisasterApiSource::from_fixture(FEED_JSON);

    let page = source.fetch_page(1).await.expect("feed parse ok");
    assert_eq!(page.len(), 3);

    let mut sns: Vec<u64> = page.iter().map(|m| m.sn).collect();
    sns.sort_unstable();
    assert_eq!(sns, vec![1049, 1051, 1052]);
}

#[tokio::test]
async fn feed_fields_map_onto_the_record() {
    let source = DisasterApiSource::from_fixture(FEED_JSON);
    let page = source.fetch_page(1).await.unwrap();

    let alert = page.iter().find(|m| m.sn == 1051).unwrap();
    assert!(alert.message.contains("호우경보"));
    assert_eq!(
        alert.region,
        "서울특별시 서울특별시 종로구,서울특별시 중구 전체"
    );
    assert_eq!(alert.created_at, "2024/03/15 13:05:00");
    assert_eq!(alert.kind, "호우");
}

#[tokio::test]
async fn fixtures_are_a_single_page() {
    let source = DisasterApiSource::from_fixture(FEED_JSON);
    let page2 = source.fetch_page(2).await.unwrap();
    assert!(page2.is_empty());
}

#[tokio::test]
async fn feed_application_error_degrades_to_empty() {
    let source = DisasterApiSource::from_fixture(
        r#"{"header":{"resultCode":"22","errorMsg":"LIMITED NUMBER OF SERVICE REQUESTS EXCEEDS"},"body":[]}"#,
    );
    let page = source.fetch_page(1).await.expect("application error is not a transport error");
    assert!(page.is_empty());
}
