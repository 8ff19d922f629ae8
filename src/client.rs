// src/client.rs
//! DaePiro API server client: high-water-mark reads and batch writes.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Secrets;
use crate::normalize;

/// Application-level success code of the API server envelope.
const SUCCESS_CODE: i64 = 1000;

/// One row of the `POST /v1/datacollector/disasters` batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisasterRecord {
    pub generated_at: String,
    pub message_id: u64,
    pub message: String,
    pub location_str: String,
    pub disaster_type: String,
}

/// One row of the `POST /v1/datacollector/news` batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewsRecord {
    pub title: String,
    pub published_at: String,
    pub subtitle: String,
    pub body: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LatestDisaster {
    #[serde(rename = "messageId")]
    message_id: u64,
}

#[derive(Debug, Deserialize)]
struct LatestNews {
    #[serde(rename = "publishedAt")]
    published_at: String,
}

#[derive(Debug, Serialize)]
struct DisasterBatch<'a> {
    disasters: &'a [DisasterRecord],
}

#[derive(Debug, Serialize)]
struct NewsBatch<'a> {
    news: &'a [NewsRecord],
}

/// Seam between the pipelines and the API server, mockable in tests.
#[async_trait::async_trait]
pub trait DaepiroApi: Send + Sync {
    /// Highest accepted alert serial number, `Ok(None)` when the server has
    /// none to offer (empty store or application error).
    async fn latest_disaster_sn(&self) -> Result<Option<u64>>;
    /// `publishedAt` of the most recently accepted article.
    async fn latest_news_published_at(&self) -> Result<Option<NaiveDateTime>>;
    async fn post_disasters(&self, records: &[DisasterRecord]) -> Result<()>;
    async fn post_news(&self, records: &[NewsRecord]) -> Result<()>;
}

pub struct HttpApi {
    base_url: String,
    token: String,
    client: Client,
}

impl HttpApi {
    pub fn new(secrets: &Secrets) -> Self {
        Self {
            base_url: secrets.api_server_base_url.clone(),
            token: secrets.admin_access_token.clone(),
            client: Client::new(),
        }
    }

    async fn get_latest<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{path}", self.base_url);
        let env: Envelope<T> = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("GET {path}"))?
            .error_for_status()
            .with_context(|| format!("GET {path} non-2xx"))?
            .json()
            .await
            .with_context(|| format!("GET {path} envelope"))?;

        if env.code != SUCCESS_CODE {
            tracing::debug!(
                code = env.code,
                message = env.message.as_deref().unwrap_or("-"),
                path,
                "api server returned no latest record"
            );
            return Ok(None);
        }
        Ok(env.data)
    }

    async fn post_batch<B: Serialize>(&self, path: &str, batch: &B) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let env: Envelope<serde_json::Value> = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(batch)
            .send()
            .await
            .with_context(|| format!("POST {path}"))?
            .error_for_status()
            .with_context(|| format!("POST {path} non-2xx"))?
            .json()
            .await
            .with_context(|| format!("POST {path} envelope"))?;

        if env.code != SUCCESS_CODE {
            return Err(anyhow!(
                "POST {path} application error {}: {}",
                env.code,
                env.message.as_deref().unwrap_or("-")
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DaepiroApi for HttpApi {
    async fn latest_disaster_sn(&self) -> Result<Option<u64>> {
        let latest: Option<LatestDisaster> =
            self.get_latest("/v1/datacollector/disasters/latest").await?;
        Ok(latest.map(|l| l.message_id))
    }

    async fn latest_news_published_at(&self) -> Result<Option<NaiveDateTime>> {
        let latest: Option<LatestNews> = self.get_latest("/v1/datacollector/news/latest").await?;
        latest
            .map(|l| normalize::parse_published_at(&l.published_at))
            .transpose()
    }

    async fn post_disasters(&self, records: &[DisasterRecord]) -> Result<()> {
        self.post_batch(
            "/v1/datacollector/disasters",
            &DisasterBatch { disasters: records },
        )
        .await
    }

    async fn post_news(&self, records: &[NewsRecord]) -> Result<()> {
        self.post_batch("/v1/datacollector/news", &NewsBatch { news: records })
            .await
    }
}
