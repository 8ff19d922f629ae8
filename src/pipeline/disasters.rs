// src/pipeline/disasters.rs
//! Disaster-alert pipeline: resolve the mark, page through today's alerts,
//! forward the delta sorted newest-first.

use metrics::{counter, gauge};

use crate::client::{DaepiroApi, DisasterRecord};
use crate::normalize;
use crate::pipeline::{ensure_metrics_described, RunOutcome};
use crate::sources::types::{DisasterMessage, DisasterSource};
use crate::sync::{self, MarkPolicy};

#[derive(Debug, Clone, Copy)]
pub struct DisasterRunCfg {
    /// Page size requested upstream; a shorter page ends pagination.
    pub num_of_rows: u32,
    /// Hard cap on pages per run.
    pub max_pages: u32,
    pub mark_policy: MarkPolicy,
}

impl Default for DisasterRunCfg {
    fn default() -> Self {
        Self {
            num_of_rows: crate::sources::disaster_api::DEFAULT_NUM_OF_ROWS,
            max_pages: 10,
            // Fail-closed: without a mark this pipeline skips the run.
            mark_policy: MarkPolicy::SkipRun,
        }
    }
}

pub async fn run_once(
    source: &dyn DisasterSource,
    api: &dyn DaepiroApi,
    cfg: &DisasterRunCfg,
) -> RunOutcome {
    ensure_metrics_described();
    counter!("collector_runs_total").increment(1);

    let mark = match api.latest_disaster_sn().await {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = ?e, "latest disaster sn unavailable");
            counter!("collector_api_errors_total").increment(1);
            None
        }
    };

    if sync::should_skip(mark.as_ref(), cfg.mark_policy) {
        tracing::info!("no high-water mark, fail-closed run skipped");
        return RunOutcome::SkippedNoMark;
    }

    let fetched = fetch_until_mark(source, mark, cfg).await;
    let (mut delta, dropped) = sync::delta(fetched, mark.as_ref(), |m| m.sn);
    counter!("collector_dropped_total").increment(dropped as u64);

    // Newest first, as the API server expects alert batches.
    delta.sort_by(|a, b| b.sn.cmp(&a.sn));

    let records = build_records(&delta);
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    gauge!("collector_last_run_ts").set(now as f64);

    if records.is_empty() {
        tracing::info!(dropped, "no new disaster messages");
        return RunOutcome::NoNewRecords;
    }

    match api.post_disasters(&records).await {
        Ok(()) => {
            counter!("collector_published_total").increment(records.len() as u64);
            tracing::info!(
                target: "collector",
                published = records.len(),
                messages = delta.len(),
                dropped,
                "disaster batch stored"
            );
            RunOutcome::Published(records.len())
        }
        Err(e) => {
            tracing::error!(error = ?e, records = records.len(), "disaster batch store failed");
            counter!("collector_api_errors_total").increment(1);
            RunOutcome::PublishFailed
        }
    }
}

/// Page through today's alerts until end-of-data, the mark boundary, or the
/// page cap. A failed page ends pagination with whatever came before it.
async fn fetch_until_mark(
    source: &dyn DisasterSource,
    mark: Option<u64>,
    cfg: &DisasterRunCfg,
) -> Vec<DisasterMessage> {
    let mut all = Vec::new();
    for page_no in 1..=cfg.max_pages {
        let page = match source.fetch_page(page_no).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = ?e, source = source.name(), page_no, "source error");
                counter!("collector_source_errors_total").increment(1);
                break;
            }
        };

        let page_len = page.len() as u32;
        let reached_mark = mark.is_some_and(|m| page.iter().any(|msg| msg.sn <= m));
        all.extend(page);

        if page_len < cfg.num_of_rows || reached_mark {
            break;
        }
    }
    all
}

/// One record per comma-separated receiving region, normalized. Alerts with
/// an unparsable timestamp are dropped rather than failing the batch.
fn build_records(messages: &[DisasterMessage]) -> Vec<DisasterRecord> {
    let mut out = Vec::new();
    for msg in messages {
        let generated_at = match normalize::disaster_generated_at(&msg.created_at) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = ?e, sn = msg.sn, "alert with bad CRT_DT skipped");
                continue;
            }
        };
        for location in msg.region.split(',') {
            out.push(DisasterRecord {
                generated_at: generated_at.clone(),
                message_id: msg.sn,
                message: msg.message.clone(),
                location_str: normalize::normalize_location(location),
                disaster_type: msg.kind.clone(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sn: u64, region: &str) -> DisasterMessage {
        DisasterMessage {
            sn,
            message: "호우경보".into(),
            region: region.into(),
            created_at: "2024/03/15 14:30:00".into(),
            kind: "호우".into(),
        }
    }

    #[test]
    fn regions_expand_per_comma() {
        let records = build_records(&[msg(1051, "서울특별시 종로구,경기도 전체")]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location_str, "서울특별시 종로구");
        assert_eq!(records[1].location_str, "경기도");
        assert!(records.iter().all(|r| r.message_id == 1051));
    }

    #[test]
    fn bad_timestamp_drops_only_that_alert() {
        let mut bad = msg(1052, "서울특별시");
        bad.created_at = "soon".into();
        let records = build_records(&[bad, msg(1051, "부산광역시")]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message_id, 1051);
    }
}
