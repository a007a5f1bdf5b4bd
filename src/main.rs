use stock_sniper::batch::{deliver, run_batch, BatchReport};
use stock_sniper::config::{load_config, AppConfig};
use stock_sniper::fetcher::YahooFetcher;
use stock_sniper::normalizer::normalize_symbols;
use stock_sniper::notifier::TelegramNotifier;
use stock_sniper::storage::SqliteStorage;
use stock_sniper::AnalyzerImpl;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

/// Telegram channel plus the ledger that keeps it from repeating itself.
struct Delivery {
    notifier: TelegramNotifier,
    recipient: String,
    storage: Mutex<SqliteStorage>,
}

fn build_delivery(config: &AppConfig) -> Option<Delivery> {
    let telegram = config.telegram.as_ref()?;
    let notifier = match TelegramNotifier::new(telegram) {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to initialize notifier: {}", e);
            return None;
        }
    };
    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return None;
        }
    };
    Some(Delivery {
        notifier,
        recipient: telegram.chat_id.to_string(),
        storage: Mutex::new(storage),
    })
}

fn log_report(report: &BatchReport) {
    for (symbol, summary) in report.succeeded() {
        info!("\n{}\n{}", symbol, summary);
    }
    for (symbol, err) in report.failed() {
        warn!("Error analyzing {}: {}", symbol, err);
    }
    info!(
        "Batch finished: {} succeeded, {} failed",
        report.succeeded().count(),
        report.failed().count()
    );
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    let path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", path, e);
            return;
        }
    };

    let symbols = normalize_symbols(&config.symbols);
    let fetcher = match YahooFetcher::new(&config.fetch) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to initialize fetcher: {}", e);
            return;
        }
    };
    let analyzer = AnalyzerImpl::new();
    let delivery = build_delivery(&config);
    if delivery.is_none() {
        info!("No notifier configured, results are only logged.");
    }

    loop {
        info!("Analyzing {} symbols ({})", symbols.len(), config.period);
        let report = run_batch(
            &symbols,
            &config.period,
            &fetcher,
            &analyzer,
            config.max_concurrency,
        )
        .await;
        log_report(&report);

        if let Some(d) = &delivery {
            let stats = deliver(&report, &d.notifier, &d.recipient, &d.storage).await;
            info!(
                "Notifications: {} sent, {} already sent, {} failed",
                stats.sent, stats.skipped, stats.failed
            );
        }

        let Some(interval) = config.check_interval_seconds else {
            break;
        };
        info!("Waiting {}s for the next run...", interval);
        tokio::select! {
            _ = sleep(Duration::from_secs(interval)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested.");
                break;
            }
        }
    }
}
