// src/sources/types.rs
use anyhow::Result;

/// One cell-broadcast alert as the government feed hands it out.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct DisasterMessage {
    pub sn: u64,          // serial number, the ordering key
    pub message: String,  // alert text
    pub region: String,   // comma-separated receiving regions, raw
    pub created_at: String, // source form "YYYY/MM/DD HH:MM:SS"
    pub kind: String,     // disaster category name
}

/// One article scraped from the news listing page.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct NewsArticle {
    pub created_at: String, // source form "MM-DD HH:MM", no year
    pub title: String,
    pub link: String,
    pub subtitle: String,
    pub thumbnail_url: Option<String>,
}

#[async_trait::async_trait]
pub trait DisasterSource: Send + Sync {
    /// Fetch one page of today's alerts. Pages start at 1.
    async fn fetch_page(&self, page_no: u32) -> Result<Vec<DisasterMessage>>;
    fn name(&self) -> &'static str;
}

#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<NewsArticle>>;
    fn name(&self) -> &'static str;
}
