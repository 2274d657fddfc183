//! Brandscout daemon - main entry point.
//! JSON-RPC server + ticker (background batch runner) composition root.

mod telemetry;
mod ticker;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use brandscout_api_rpc::{server::RpcServerConfig, RpcServer};
use brandscout_core::application::shutdown::shutdown_channel;
use brandscout_core::domain::ProviderKind;
use brandscout_core::port::id_provider::UuidProvider;
use brandscout_core::port::time_provider::SystemTimeProvider;
use brandscout_core::port::{Evaluator, Generator, NoopEmailNotifier};
use brandscout_infra_providers::{
    ClaudeProvider, CloudflareProvider, DeepSeekProvider, KimiProvider, RdapAvailabilityLookup,
    RegistrarPricingLookup,
};
use brandscout_infra_sqlite::{create_pool, run_job_index_migrations, JobStoreManager, SqliteJobIndex};
use ticker::{ProviderRegistry, Ticker, TickerConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_DIR: &str = "~/.brandscout/jobs";
const DEFAULT_INDEX_DB_PATH: &str = "~/.brandscout/index.db";

fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}/{rest}");
        }
    }
    path.to_string()
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_provider_kind(name: &str, default: ProviderKind) -> ProviderKind {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging.
    let log_format = std::env::var("BRANDSCOUT_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("brandscout=info"))
        .expect("failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("brandscout daemon v{} starting...", VERSION);

    if let Err(e) = telemetry::init_telemetry() {
        tracing::warn!(error = ?e, "failed to initialize OpenTelemetry (continuing without it)");
    }

    // 2. Load configuration.
    let db_dir = std::env::var("BRANDSCOUT_DB_DIR").unwrap_or_else(|_| expand_tilde(DEFAULT_DB_DIR));
    let index_db_path = expand_tilde(DEFAULT_INDEX_DB_PATH);
    let rpc_port: u16 = env_i64("BRANDSCOUT_RPC_PORT", 8177) as u16;
    let max_batches = env_i64("BRANDSCOUT_MAX_BATCHES", 6);
    let target_results = env_i64("BRANDSCOUT_TARGET_RESULTS", 25);
    let tick_interval_ms = env_u64("BRANDSCOUT_TICK_INTERVAL_MS", 1_000);
    let default_driver = env_provider_kind("BRANDSCOUT_DRIVER_PROVIDER", ProviderKind::Claude);
    let default_swarm = env_provider_kind("BRANDSCOUT_SWARM_PROVIDER", ProviderKind::Claude);

    info!(db_dir = %db_dir, index_db_path = %index_db_path, "initializing storage...");

    if let Some(parent) = std::path::Path::new(&index_db_path).parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    // 3. Initialize storage.
    let index_pool = create_pool(&format!("sqlite://{index_db_path}"))
        .await
        .map_err(|e| anyhow::anyhow!("index DB pool creation failed: {}", e))?;
    run_job_index_migrations(&index_pool)
        .await
        .map_err(|e| anyhow::anyhow!("index migration failed: {}", e))?;

    let job_index: Arc<dyn brandscout_core::port::JobIndex> =
        Arc::new(SqliteJobIndex::new(index_pool));
    let job_store_manager = Arc::new(JobStoreManager::new(db_dir));
    let job_store_opener: Arc<dyn brandscout_core::port::JobStoreOpener> = job_store_manager;

    // 4. Setup dependencies (DI wiring).
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let email = Arc::new(NoopEmailNotifier);

    let availability: Arc<dyn brandscout_core::port::AvailabilityLookup> =
        Arc::new(RdapAvailabilityLookup::new());

    let pricing_base_url = std::env::var("BRANDSCOUT_PRICING_BASE_URL")
        .unwrap_or_else(|_| "https://pricing.invalid".to_string());
    let pricing_api_key = std::env::var("BRANDSCOUT_PRICING_API_KEY").ok();
    let pricing: Arc<dyn brandscout_core::port::PricingLookup> =
        Arc::new(RegistrarPricingLookup::new(pricing_base_url, pricing_api_key));

    let mut providers = ProviderRegistry::new(default_driver, default_swarm);

    if let Ok(key) = std::env::var("BRANDSCOUT_CLAUDE_API_KEY") {
        let provider = Arc::new(ClaudeProvider::new(key, "claude-sonnet-4-5"));
        providers.register(
            ProviderKind::Claude,
            provider.clone() as Arc<dyn Generator>,
            provider as Arc<dyn Evaluator>,
        );
    }
    if let Ok(key) = std::env::var("BRANDSCOUT_DEEPSEEK_API_KEY") {
        let provider = Arc::new(DeepSeekProvider::new(key));
        providers.register(
            ProviderKind::Deepseek,
            provider.clone() as Arc<dyn Generator>,
            provider as Arc<dyn Evaluator>,
        );
    }
    if let Ok(key) = std::env::var("BRANDSCOUT_KIMI_API_KEY") {
        let provider = Arc::new(KimiProvider::new(key));
        providers.register(
            ProviderKind::Kimi,
            provider.clone() as Arc<dyn Generator>,
            provider as Arc<dyn Evaluator>,
        );
    }
    if let (Ok(token), Ok(account_id)) = (
        std::env::var("BRANDSCOUT_CLOUDFLARE_API_TOKEN"),
        std::env::var("BRANDSCOUT_CLOUDFLARE_ACCOUNT_ID"),
    ) {
        let provider = Arc::new(CloudflareProvider::new(token, account_id));
        providers.register(
            ProviderKind::Cloudflare,
            provider.clone() as Arc<dyn Generator>,
            provider as Arc<dyn Evaluator>,
        );
    }
    let providers = Arc::new(providers);

    // 5. Start JSON-RPC server.
    info!("starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        port: rpc_port,
        ..Default::default()
    };
    let rpc_server = RpcServer::new(
        rpc_config,
        job_store_opener.clone(),
        job_index.clone(),
        id_provider.clone(),
        time_provider.clone(),
        email.clone(),
    );
    let rpc_handle = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 6. Start the ticker (background batch runner).
    info!("starting ticker...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let ticker = Arc::new(Ticker::new(
        job_store_opener,
        job_index,
        providers,
        availability,
        pricing,
        time_provider,
        id_provider,
        email,
        TickerConfig {
            tick_interval_ms,
            max_batches,
            target_results,
        },
    ));

    let ticker_handle = tokio::spawn({
        let ticker = ticker.clone();
        async move {
            ticker.run(shutdown_rx).await;
        }
    });

    info!("system ready, waiting for jobs");
    info!("press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal.
    tokio::signal::ctrl_c().await?;

    info!("shutdown signal received, exiting gracefully...");

    // 8. Graceful shutdown.
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), ticker_handle).await;

    info!("shutdown complete.");

    Ok(())
}
