// tests/providers_news_feed.rs
use vigimanaus_ingest::ingest::providers::NewsFeedAdapter;
use vigimanaus_ingest::ingest::types::SourceAdapter;

const EIOS_XML: &str = include_str!("fixtures/eios_rss.xml");

#[tokio::test]
async fn eios_fixture_yields_entries_verbatim() {
    let feed = NewsFeedAdapter::from_fixture_str(EIOS_XML);

    let entries = feed.fetch_records().await.expect("feed parse ok");
    assert_eq!(entries.len(), 3);
    assert!(
        entries.iter().all(|e| !e.title.is_empty() && !e.link.is_empty()),
        "every entry should carry a title and a link"
    );
    assert_eq!(entries[2].summary, "More than 200 suspected cases & 3 deaths.");
    assert_eq!(feed.label(&entries[0]), "Oropouche fever cases confirmed in Amazonas");
}

#[tokio::test]
async fn unreachable_feed_is_source_error() {
    let feed = NewsFeedAdapter::from_url("http://127.0.0.1:9/feed", std::time::Duration::from_secs(2))
        .expect("client");
    let err = feed.fetch_records().await.unwrap_err();
    assert_eq!(err.source_name, "news_feed");
}
