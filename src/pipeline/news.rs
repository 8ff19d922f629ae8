// src/pipeline/news.rs
//! Safety-news pipeline: resolve the mark, scrape the listing page, forward
//! the delta in source order.

use chrono::NaiveDateTime;
use metrics::{counter, gauge};

use crate::client::{DaepiroApi, NewsRecord};
use crate::normalize;
use crate::pipeline::{ensure_metrics_described, RunOutcome};
use crate::sources::types::{NewsArticle, NewsSource};
use crate::sync::{self, MarkPolicy};

#[derive(Debug, Clone, Copy)]
pub struct NewsRunCfg {
    /// Year the listing's relative `MM-DD HH:MM` stamps are anchored to.
    pub year: i32,
    pub mark_policy: MarkPolicy,
}

impl NewsRunCfg {
    /// Fail-open, with relative stamps anchored to the current year.
    pub fn for_current_year() -> Self {
        use chrono::Datelike;
        Self {
            year: chrono::Local::now().year(),
            mark_policy: MarkPolicy::ForwardAll,
        }
    }
}

pub async fn run_once(source: &dyn NewsSource, api: &dyn DaepiroApi, cfg: &NewsRunCfg) -> RunOutcome {
    ensure_metrics_described();
    counter!("collector_runs_total").increment(1);

    let mark = match api.latest_news_published_at().await {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = ?e, "latest publishedAt unavailable, forwarding unfiltered");
            counter!("collector_api_errors_total").increment(1);
            None
        }
    };

    if sync::should_skip(mark.as_ref(), cfg.mark_policy) {
        tracing::info!("no high-water mark, fail-closed run skipped");
        return RunOutcome::SkippedNoMark;
    }

    let articles = match source.fetch_latest().await {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(error = ?e, source = source.name(), "source error");
            counter!("collector_source_errors_total").increment(1);
            Vec::new()
        }
    };

    let stamped = stamp_articles(articles, cfg.year);
    let (delta, dropped) = sync::delta(stamped, mark.as_ref(), |(_, ts)| *ts);
    counter!("collector_dropped_total").increment(dropped as u64);

    let records: Vec<NewsRecord> = delta
        .into_iter()
        .map(|(article, ts)| NewsRecord {
            title: article.title,
            published_at: normalize::format_published_at(&ts),
            subtitle: article.subtitle,
            body: article.link,
            thumbnail_url: article.thumbnail_url,
        })
        .collect();

    let now = chrono::Utc::now().timestamp().max(0) as u64;
    gauge!("collector_last_run_ts").set(now as f64);

    if records.is_empty() {
        // The "204 No Content" of this pipeline: nothing crosses the wire.
        tracing::info!(dropped, "no new articles to send");
        return RunOutcome::NoNewRecords;
    }

    match api.post_news(&records).await {
        Ok(()) => {
            counter!("collector_published_total").increment(records.len() as u64);
            tracing::info!(
                target: "collector",
                published = records.len(),
                dropped,
                "news batch stored"
            );
            RunOutcome::Published(records.len())
        }
        Err(e) => {
            tracing::error!(error = ?e, records = records.len(), "news batch store failed");
            counter!("collector_api_errors_total").increment(1);
            RunOutcome::PublishFailed
        }
    }
}

/// Pair each article with its absolute publish timestamp, preserving listing
/// order. Articles with an unparsable stamp are dropped.
fn stamp_articles(articles: Vec<NewsArticle>, year: i32) -> Vec<(NewsArticle, NaiveDateTime)> {
    let mut out = Vec::with_capacity(articles.len());
    for article in articles {
        match normalize::news_published_at(&article.created_at, year) {
            Ok(ts) => out.push((article, ts)),
            Err(e) => {
                tracing::warn!(error = ?e, title = %article.title, "article with bad stamp skipped");
            }
        }
    }
    out
}
