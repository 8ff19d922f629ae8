//! DaePiro Data Collector — Binary Entrypoint
//! One-shot pipeline runs (`disasters`, `news`, `all`) for scheduled
//! invocation, plus a `daemon` mode that keeps both collectors ticking.
//!
//! See `README.md` for the secret keys each run expects.

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use daepiro_datacollector::client::HttpApi;
use daepiro_datacollector::config::Secrets;
use daepiro_datacollector::normalize;
use daepiro_datacollector::pipeline::{disasters, news, RunOutcome};
use daepiro_datacollector::scheduler::{spawn_collectors, CollectorSchedulerCfg};
use daepiro_datacollector::sources::disaster_api::DisasterApiSource;
use daepiro_datacollector::sources::news_page::NewsPageSource;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("daepiro_datacollector=info,collector=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn run_disasters(secrets: &Secrets) -> RunOutcome {
    let cfg = disasters::DisasterRunCfg::default();
    let source = DisasterApiSource::from_url(
        secrets.disaster_message_api_url.clone(),
        secrets.disaster_message_api_service_key.clone(),
        cfg.num_of_rows,
        normalize::crt_dt_for(chrono::Local::now().date_naive()),
    );
    let api = HttpApi::new(secrets);
    disasters::run_once(&source, &api, &cfg).await
}

async fn run_news(secrets: &Secrets) -> RunOutcome {
    let source = NewsPageSource::from_url(secrets.disaster_news_url.clone());
    let api = HttpApi::new(secrets);
    news::run_once(&source, &api, &news::NewsRunCfg::for_current_year()).await
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in deployed environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());

    // Secret failure is the one fatal condition; everything downstream
    // degrades and logs instead.
    let secrets = Secrets::load().context("loading secrets")?;

    match mode.as_str() {
        "disasters" => {
            let outcome = run_disasters(&secrets).await;
            tracing::info!(?outcome, "disaster collector finished");
        }
        "news" => {
            let outcome = run_news(&secrets).await;
            tracing::info!(?outcome, "news collector finished");
        }
        "all" => {
            let disasters = run_disasters(&secrets).await;
            let news = run_news(&secrets).await;
            tracing::info!(?disasters, ?news, "collectors finished");
        }
        "daemon" => {
            let (d, n) = spawn_collectors(CollectorSchedulerCfg::default(), secrets);
            tracing::info!("collector daemon started");
            let _ = tokio::try_join!(d, n);
        }
        other => bail!("unknown mode {other:?}, expected disasters|news|all|daemon"),
    }

    Ok(())
}
