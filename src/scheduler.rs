// src/scheduler.rs
//! Daemon mode: run each collector on its own tokio interval. One-shot
//! invocations (the scheduled-function deployment) call the pipelines
//! directly and never touch this module.

use metrics::counter;
use tokio::task::JoinHandle;

use crate::client::HttpApi;
use crate::config::Secrets;
use crate::normalize;
use crate::pipeline::{disasters, news};
use crate::sources::{disaster_api::DisasterApiSource, news_page::NewsPageSource};

#[derive(Clone, Copy, Debug)]
pub struct CollectorSchedulerCfg {
    pub disaster_interval_secs: u64,
    pub news_interval_secs: u64,
}

impl Default for CollectorSchedulerCfg {
    fn default() -> Self {
        Self {
            disaster_interval_secs: 60,
            news_interval_secs: 600,
        }
    }
}

/// Spawn the disaster collector loop. Sources are rebuilt per tick so the
/// `crtDt` day filter follows the calendar.
pub fn spawn_disaster_collector(secrets: Secrets, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let cfg = disasters::DisasterRunCfg::default();
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let api = HttpApi::new(&secrets);
            let source = DisasterApiSource::from_url(
                secrets.disaster_message_api_url.clone(),
                secrets.disaster_message_api_service_key.clone(),
                cfg.num_of_rows,
                normalize::crt_dt_for(chrono::Local::now().date_naive()),
            );

            let outcome = disasters::run_once(&source, &api, &cfg).await;
            counter!("collector_ticks_total").increment(1);
            tracing::info!(target: "collector", ?outcome, "disaster tick");
        }
    })
}

/// Spawn the news collector loop.
pub fn spawn_news_collector(secrets: Secrets, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let api = HttpApi::new(&secrets);
            let source = NewsPageSource::from_url(secrets.disaster_news_url.clone());
            let cfg = news::NewsRunCfg::for_current_year();

            let outcome = news::run_once(&source, &api, &cfg).await;
            counter!("collector_ticks_total").increment(1);
            tracing::info!(target: "collector", ?outcome, "news tick");
        }
    })
}

/// Spawn both collectors with the given cadence.
pub fn spawn_collectors(
    cfg: CollectorSchedulerCfg,
    secrets: Secrets,
) -> (JoinHandle<()>, JoinHandle<()>) {
    let disasters = spawn_disaster_collector(secrets.clone(), cfg.disaster_interval_secs);
    let news = spawn_news_collector(secrets, cfg.news_interval_secs);
    (disasters, news)
}
