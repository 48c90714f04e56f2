// src/ingest/providers/news_feed.rs
//! Outbreak news from an RSS 2.0, RSS 1.0 (RDF) or Atom feed.

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::analyze::classification::NewsClassification;
use crate::analyze::prompt::{NewsPromptFields, PromptFields};
use crate::error::{MappingError, SourceError};
use crate::ingest::types::{RawNewsEntry, SourceAdapter};
use crate::signal::{Signal, SignalStatus, SourceId, CITY_CENTROID, LOCATION_MAX_CHARS};

pub const SOURCE_NAME: &str = "news_feed";

// RSS 2.0
#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

// RSS 1.0: items are siblings of the channel under <rdf:RDF>
#[derive(Debug, Deserialize)]
struct RdfFeed {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

// Atom
#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}
#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
}
#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn alternate_link(&self) -> Option<String> {
        self.link
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .or_else(|| self.link.first())
            .and_then(|l| l.href.clone())
    }
}

impl From<Item> for RawNewsEntry {
    fn from(it: Item) -> Self {
        RawNewsEntry {
            title: it.title.unwrap_or_default(),
            summary: it.description.unwrap_or_default(),
            link: it.link.unwrap_or_default(),
        }
    }
}

/// Parse a feed document into entries. Accepts RSS 2.0, RSS 1.0 and Atom.
pub fn parse_feed(xml: &str) -> Result<Vec<RawNewsEntry>, String> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    match root_element(&xml_clean).as_deref() {
        Some("rss") => {
            let rss: Rss = from_str(&xml_clean).map_err(|e| format!("parsing rss xml: {e}"))?;
            Ok(rss.channel.item.into_iter().map(RawNewsEntry::from).collect())
        }
        Some("RDF") => {
            let rdf: RdfFeed =
                from_str(&xml_clean).map_err(|e| format!("parsing rdf xml: {e}"))?;
            Ok(rdf.item.into_iter().map(RawNewsEntry::from).collect())
        }
        Some("feed") => {
            let feed: AtomFeed =
                from_str(&xml_clean).map_err(|e| format!("parsing atom xml: {e}"))?;
            Ok(feed
                .entry
                .into_iter()
                .map(|e| {
                    let link = e.alternate_link().unwrap_or_default();
                    RawNewsEntry {
                        title: e.title.unwrap_or_default(),
                        summary: e.summary.or(e.content).unwrap_or_default(),
                        link,
                    }
                })
                .collect())
        }
        Some(other) => Err(format!("unsupported feed root element <{other}>")),
        None => Err("document has no root element".to_string()),
    }
}

fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

// HTML named entities are not defined in XML and break the parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

pub struct NewsFeedAdapter {
    mode: Mode,
    location_max_chars: usize,
}

impl NewsFeedAdapter {
    pub fn from_url(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent("vigimanaus-ingest/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::new(SOURCE_NAME, format!("http client: {e}")))?;
        Ok(Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
            location_max_chars: LOCATION_MAX_CHARS,
        })
    }

    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            location_max_chars: LOCATION_MAX_CHARS,
        }
    }

    pub fn with_location_max_chars(mut self, n: usize) -> Self {
        self.location_max_chars = n;
        self
    }

    async fn fetch_body(&self) -> Result<String, SourceError> {
        match &self.mode {
            Mode::Fixture(s) => Ok(s.clone()),
            Mode::Http { url, client } => {
                tracing::info!(source = SOURCE_NAME, url = %url, "fetching feed");
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| SourceError::new(SOURCE_NAME, format!("feed http get: {e}")))?;
                let status = resp.status();
                tracing::info!(source = SOURCE_NAME, status = status.as_u16(), "feed responded");
                if !status.is_success() {
                    return Err(SourceError::new(
                        SOURCE_NAME,
                        format!("feed returned HTTP {status}"),
                    ));
                }
                resp.text()
                    .await
                    .map_err(|e| SourceError::new(SOURCE_NAME, format!("feed body: {e}")))
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for NewsFeedAdapter {
    type Record = RawNewsEntry;
    type Classification = NewsClassification;

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_records(&self) -> Result<Vec<RawNewsEntry>, SourceError> {
        let body = self.fetch_body().await?;
        let entries = parse_feed(&body).map_err(|e| SourceError::new(SOURCE_NAME, e))?;
        if entries.is_empty() {
            return Err(SourceError::new(SOURCE_NAME, "feed has no entries"));
        }
        tracing::info!(source = SOURCE_NAME, records = entries.len(), "feed entries found");
        Ok(entries)
    }

    fn label(&self, e: &RawNewsEntry) -> String {
        e.title.clone()
    }

    fn prompt_fields<'a>(&self, e: &'a RawNewsEntry) -> Result<PromptFields<'a>, MappingError> {
        if e.title.trim().is_empty() {
            return Err(MappingError::MissingInput("title"));
        }
        Ok(PromptFields::News(NewsPromptFields {
            title: &e.title,
            summary: &e.summary,
        }))
    }

    /// News is not geocoded precisely, so the point is always the city centroid.
    fn to_signal(&self, e: &RawNewsEntry, c: NewsClassification) -> Result<Signal, MappingError> {
        let status = if c.relevant {
            SignalStatus::Pending
        } else {
            SignalStatus::Discarded
        };
        Ok(Signal {
            title: format!("[{}] {}", c.disease, e.title),
            description: format!("{} (Fonte Original: {})", e.summary, e.link),
            status,
            risk: c.risk,
            location: c.location,
            point: CITY_CENTROID,
            source: SourceId::NewsFeed,
        }
        .truncate_location(self.location_max_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::RiskLevel;

    #[test]
    fn rss_with_html_entities_parses() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>EIOS</title>
  <item><title>Dengue&nbsp;cases rise</title><link>https://n.example/1</link>
        <description>Manaus &amp; Parintins</description></item>
  <item><title>Cholera</title><link>https://n.example/2</link></item>
</channel></rss>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Dengue cases rise");
        assert_eq!(entries[0].summary, "Manaus & Parintins");
        assert_eq!(entries[1].summary, "");
    }

    #[test]
    fn atom_prefers_alternate_link() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>News</title>
  <entry><title>Measles</title>
    <link rel="self" href="https://n.example/self"/>
    <link rel="alternate" href="https://n.example/measles"/>
    <summary>Outbreak in the north</summary></entry>
</feed>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://n.example/measles");
        assert_eq!(entries[0].summary, "Outbreak in the north");
    }

    #[test]
    fn rss_items_split_by_channel_elements_all_parse() {
        let xml = r#"<rss version="2.0"><channel><title>EIOS</title>
  <item><title>Dengue</title><link>https://n.example/1</link></item>
  <lastBuildDate>Mon, 06 Oct 2025 10:00:00 GMT</lastBuildDate>
  <item><title>Mpox</title><link>https://n.example/2</link></item>
</channel></rss>"#;
        let entries = parse_feed(xml).unwrap();
        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Dengue", "Mpox"]);
    }

    #[test]
    fn atom_links_split_by_id_parse() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry><title>Yellow fever</title>
    <link rel="alternate" href="https://n.example/yf"/>
    <id>urn:1</id>
    <link rel="enclosure" href="https://n.example/yf.mp3"/>
  </entry>
  <updated>2025-10-06T10:00:00Z</updated>
  <entry><title>Malaria</title><link href="https://n.example/mal"/></entry>
</feed>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].link, "https://n.example/yf");
        assert_eq!(entries[1].link, "https://n.example/mal");
    }

    #[test]
    fn rss1_rdf_items_parse() {
        let xml = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://n.example/"><title>Alerts</title><link>https://n.example/</link></channel>
  <item rdf:about="https://n.example/a"><title>Leptospirosis</title>
    <link>https://n.example/a</link><description>Flooding in Manaus</description></item>
  <item rdf:about="https://n.example/b"><title>Hepatitis A</title><link>https://n.example/b</link></item>
</rdf:RDF>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Leptospirosis");
        assert_eq!(entries[0].summary, "Flooding in Manaus");
        assert_eq!(entries[1].link, "https://n.example/b");
    }

    #[test]
    fn html_document_is_rejected() {
        assert!(parse_feed("<html><body>maintenance</body></html>").is_err());
        assert!(parse_feed("").is_err());
    }

    #[tokio::test]
    async fn empty_channel_is_source_error() {
        let a = NewsFeedAdapter::from_fixture_str(r#"<rss><channel><title>x</title></channel></rss>"#);
        let err = a.fetch_records().await.unwrap_err();
        assert_eq!(err.source_name, SOURCE_NAME);
    }

    #[test]
    fn irrelevant_entry_differs_only_in_status_and_text() {
        let a = NewsFeedAdapter::from_fixture_str("");
        let e = RawNewsEntry {
            title: "Avian flu".into(),
            summary: "H5N1 detected".into(),
            link: "https://n.example/3".into(),
        };
        let class = |relevant, disease: &str| NewsClassification {
            relevant,
            disease: disease.into(),
            location: "Chile".into(),
            risk: RiskLevel::Medium,
        };
        let kept = a.to_signal(&e, class(true, "Influenza")).unwrap();
        let dropped = a.to_signal(&e, class(false, "Geral")).unwrap();

        assert_eq!(kept.status, SignalStatus::Pending);
        assert_eq!(dropped.status, SignalStatus::Discarded);
        assert_eq!(kept.title, "[Influenza] Avian flu");
        assert_eq!(kept.description, "H5N1 detected (Fonte Original: https://n.example/3)");
        assert_eq!(kept.point, dropped.point);
        assert_eq!(kept.point, CITY_CENTROID);
        assert_eq!(kept.source, SourceId::NewsFeed);
        assert_eq!(dropped.source, SourceId::NewsFeed);
    }
}
