// src/sources/disaster_api.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::sources::types::{DisasterMessage, DisasterSource};

/// Page size the feed is asked for; also the end-of-data heuristic (a page
/// shorter than this is the last one).
pub const DEFAULT_NUM_OF_ROWS: u32 = 200;

#[derive(Debug, Deserialize)]
struct FeedResponse {
    header: FeedHeader,
    #[serde(default)]
    body: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedHeader {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "errorMsg", default)]
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(rename = "SN")]
    sn: u64,
    #[serde(rename = "MSG_CN")]
    msg_cn: String,
    #[serde(rename = "RCPTN_RGN_NM")]
    rcptn_rgn_nm: String,
    #[serde(rename = "CRT_DT")]
    crt_dt: String,
    #[serde(rename = "DST_SE_NM")]
    dst_se_nm: String,
}

pub struct DisasterApiSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        service_key: String,
        num_of_rows: u32,
        crt_dt: String,
        client: reqwest::Client,
    },
}

impl DisasterApiSource {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    /// `crt_dt` is the day filter in `YYYYMMDD` form, normally today.
    pub fn from_url(url: String, service_key: String, num_of_rows: u32, crt_dt: String) -> Self {
        let client = reqwest::Client::new();
        Self {
            mode: Mode::Http {
                url,
                service_key,
                num_of_rows,
                crt_dt,
                client,
            },
        }
    }

    fn parse_page_from_str(s: &str) -> Result<Vec<DisasterMessage>> {
        let t0 = std::time::Instant::now();
        let resp: FeedResponse = serde_json::from_str(s).context("parsing disaster feed json")?;

        if resp.header.result_code != "00" {
            tracing::warn!(
                code = %resp.header.result_code,
                error = resp.header.error_msg.as_deref().unwrap_or("-"),
                "disaster feed application error"
            );
            return Ok(Vec::new());
        }

        let out: Vec<DisasterMessage> = resp
            .body
            .into_iter()
            .map(|it| DisasterMessage {
                sn: it.sn,
                message: it.msg_cn,
                region: it.rcptn_rgn_nm,
                created_at: it.crt_dt,
                kind: it.dst_se_nm,
            })
            .collect();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("collector_fetch_ms").record(ms);
        counter!("collector_fetched_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl DisasterSource for DisasterApiSource {
    async fn fetch_page(&self, page_no: u32) -> Result<Vec<DisasterMessage>> {
        match &self.mode {
            // Fixtures hold exactly one page.
            Mode::Fixture(s) => {
                if page_no > 1 {
                    return Ok(Vec::new());
                }
                Self::parse_page_from_str(s)
            }

            Mode::Http {
                url,
                service_key,
                num_of_rows,
                crt_dt,
                client,
            } => {
                let page = page_no.to_string();
                let rows = num_of_rows.to_string();
                let body = match client
                    .get(url)
                    .query(&[
                        ("serviceKey", service_key.as_str()),
                        ("pageNo", page.as_str()),
                        ("numOfRows", rows.as_str()),
                        ("crtDt", crt_dt.as_str()),
                    ])
                    .send()
                    .await
                {
                    Ok(resp) => resp
                        .error_for_status()
                        .context("disaster feed non-2xx")?
                        .text()
                        .await
                        .context("disaster feed .text()")?,
                    Err(e) => {
                        tracing::warn!(error = ?e, source = "disaster-feed", "source http error");
                        counter!("collector_source_errors_total").increment(1);
                        return Err(e).context("disaster feed get()");
                    }
                };
                Self::parse_page_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "disaster-feed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_error_yields_empty_page() {
        let s = r#"{"header":{"resultCode":"30","errorMsg":"SERVICE KEY IS NOT REGISTERED"},"body":[]}"#;
        let out = DisasterApiSource::parse_page_from_str(s).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(DisasterApiSource::parse_page_from_str("<html>oops</html>").is_err());
    }
}
