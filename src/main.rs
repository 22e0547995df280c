use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use context_scan::app::Engine;
use context_scan::config::ExtensionCatalog;
use context_scan::store::json::JsonStore;
use context_scan::store::ExtensionSource;

const REFRESH_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let records_path = std::env::var_os("CONTEXT_SCAN_RECORDS")
        .map(PathBuf::from)
        .or_else(JsonStore::default_path)
        .ok_or_else(|| anyhow!("could not determine the records file location"))?;
    tracing::info!("Using records file {:?}", records_path);

    let store = Arc::new(JsonStore::new(records_path));
    let catalog = Arc::new(ExtensionCatalog::new());
    let _refresh = catalog.spawn_refresh(
        Arc::clone(&store) as Arc<dyn ExtensionSource>,
        REFRESH_PERIOD,
    );
    // The first refresh tick races with a fast one-shot command, so pull
    // the custom extensions in before dispatching.
    catalog.refresh_from(store.as_ref());

    let engine = Engine::new(store.clone(), store.clone(), catalog);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("analyze") => {
            let directory = args
                .get(1)
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("usage: context-scan analyze <directory> [project-id [excluded-id...]]"))?;
            let project_id = args
                .get(2)
                .map(|raw| raw.parse::<i64>())
                .transpose()
                .context("project id must be an integer")?;
            let excluded: Vec<i64> = args
                .get(3..)
                .unwrap_or_default()
                .iter()
                .map(|raw| raw.parse())
                .collect::<Result<_, _>>()
                .context("excluded ids must be integers")?;

            let result =
                tokio::task::spawn_blocking(move || engine.analyze(&directory, project_id, &excluded))
                    .await??;
            println!("{}", result.text);
        }
        Some("metrics") => {
            let project_id: i64 = args
                .get(1)
                .ok_or_else(|| anyhow!("usage: context-scan metrics <project-id>"))?
                .parse()
                .context("project id must be an integer")?;

            let report = tokio::task::spawn_blocking(move || engine.metrics(project_id)).await??;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => bail!("usage: context-scan <analyze|metrics> ..."),
    }

    Ok(())
}
