// src/ingest/providers/mod.rs
pub mod local_reports;
pub mod news_feed;

pub use local_reports::LocalReportsAdapter;
pub use news_feed::NewsFeedAdapter;
