use lstpoints::{
    config::Config, db::init_db, AppError, AuditMirror, EventSource, Indexer, JsonLinesSource,
    PointAccumulator, Repository,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing::info!(
        database = %config.database_path,
        events = %config.events_path,
        tokens = config.weights.len(),
        "Starting points indexer"
    );

    let pool = init_db(&config.database_path).await?;
    let repo = Arc::new(Repository::new(pool));
    let source: Arc<dyn EventSource> = Arc::new(JsonLinesSource::new(&config.events_path));

    let accumulator = PointAccumulator::new(config.weights.clone(), repo.clone());
    let mirror = AuditMirror::new(repo.clone());
    let indexer = Indexer::new(source, accumulator, mirror, repo.clone(), config.on_event_error);

    let report = indexer.run().await?;
    let points = repo.count_points().await?;

    tracing::info!(
        fetched = report.events_fetched,
        transfers = report.transfers_applied,
        audits = report.audits_mirrored,
        skipped = report.events_skipped,
        points,
        "Indexing complete"
    );

    Ok(())
}
