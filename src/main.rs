use anyhow::Context;
use luxe_checkout::{
    api, config::Config, db::init_db, BalanceLedger, CatalogSource, PurchaseRecorder, Repository,
    SettlementOrchestrator, StaticCatalog,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;
    let port = config.port;

    let pool = init_db(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    // One repository serves as both the balance ledger and the purchase store.
    let repo = Arc::new(Repository::new(pool));
    let ledger: Arc<dyn BalanceLedger> = repo.clone();
    let recorder: Arc<dyn PurchaseRecorder> = repo;
    let catalog: Arc<dyn CatalogSource> = Arc::new(StaticCatalog::seeded());

    let orchestrator = Arc::new(SettlementOrchestrator::new(ledger, recorder, &config));
    let app = api::create_router(api::AppState::new(catalog, orchestrator));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(
        sales_tax_rate = %config.tax_policy.sales_tax_rate,
        luxury_tax_rate = %config.tax_policy.luxury_tax_rate,
        luxury_threshold = %config.tax_policy.luxury_threshold,
        "Server listening on {}",
        addr
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
