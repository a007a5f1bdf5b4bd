// Per-symbol pipeline runs and delivery of their results
use crate::analyzer::Analyzer;
use crate::fetcher::HistoryFetcher;
use crate::model::{Summary, SymbolError};
use crate::notifier::Notifier;
use crate::storage::SqliteStorage;
use crate::utils::fmt_opt;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub result: Result<Summary, SymbolError>,
}

/// One outcome per requested symbol, in request order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<SymbolOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &Summary)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|s| (o.symbol.as_str(), s)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &SymbolError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.symbol.as_str(), e)))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Fetch, compute and summarize a single symbol.
pub async fn process_symbol<A: Analyzer + ?Sized>(
    symbol: &str,
    period: &str,
    fetcher: &dyn HistoryFetcher,
    analyzer: &A,
) -> Result<Summary, SymbolError> {
    let series = fetcher.fetch_history(symbol, period).await?;
    info!("Fetched {} bars for {}", series.len(), symbol);
    let rows = analyzer.compute_indicators(&series)?;
    Ok(analyzer.summarize(&rows)?)
}

/// Runs every symbol independently with at most `max_concurrency` in flight.
pub async fn run_batch<A: Analyzer + Sync + ?Sized>(
    symbols: &[String],
    period: &str,
    fetcher: &dyn HistoryFetcher,
    analyzer: &A,
    max_concurrency: usize,
) -> BatchReport {
    let outcomes = stream::iter(symbols)
        .map(|symbol| async move {
            info!("Analyzing {}...", symbol);
            let result = process_symbol(symbol, period, fetcher, analyzer).await;
            match &result {
                Ok(summary) => info!(
                    "{}: close {:.2}, buy range {} - {}",
                    symbol,
                    summary.snapshot.close,
                    fmt_opt(summary.buy_range.lower),
                    fmt_opt(summary.buy_range.upper)
                ),
                Err(e) => warn!("Error analyzing {}: {}", symbol, e),
            }
            SymbolOutcome {
                symbol: symbol.clone(),
                result,
            }
        })
        .buffered(max_concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    BatchReport { outcomes }
}

pub fn subject_for(symbol: &str, summary: &Summary) -> String {
    format!(
        "Buy range for {}: ${} - ${}",
        symbol,
        fmt_opt(summary.buy_range.lower),
        fmt_opt(summary.buy_range.upper)
    )
}

/// Sends every successful summary not yet in the ledger. Failures are logged and skipped.
pub async fn deliver(
    report: &BatchReport,
    notifier: &dyn Notifier,
    recipient: &str,
    storage: &Mutex<SqliteStorage>,
) -> DeliveryStats {
    let mut stats = DeliveryStats::default();

    for (symbol, summary) in report.succeeded() {
        match storage.lock().await.is_notified(symbol, summary.snapshot.date) {
            Ok(true) => {
                info!("Already notified: {} for {}", symbol, summary.snapshot.date);
                stats.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => warn!("Notify check failed for {}: {}", symbol, e),
        }

        let body = summary.to_string();
        if let Err(e) = notifier.notify(&subject_for(symbol, summary), &body, recipient).await {
            warn!("Notification for {} failed: {}", symbol, e);
            stats.failed += 1;
            continue;
        }
        stats.sent += 1;

        if let Err(e) = storage.lock().await.mark_notified(symbol, summary) {
            warn!("Mark notified failed for {}: {}", symbol, e);
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::price_analysis::tests::series_from_closes;
    use crate::analyzer::AnalyzerImpl;
    use crate::model::{AnalysisError, FetchError, NotifyError, PriceSeries};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    enum Canned {
        Closes(Vec<f64>),
        Unreachable,
        Empty,
    }

    struct StubFetcher {
        data: HashMap<String, Canned>,
    }

    #[async_trait::async_trait]
    impl HistoryFetcher for StubFetcher {
        async fn fetch_history(&self, symbol: &str, _period: &str) -> Result<PriceSeries, FetchError> {
            match self.data.get(symbol) {
                Some(Canned::Closes(c)) => Ok(series_from_closes(c)),
                Some(Canned::Empty) => Ok(PriceSeries::default()),
                Some(Canned::Unreachable) => Err(FetchError::Timeout),
                None => Err(FetchError::NoData(symbol.to_string())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: StdMutex<Vec<(String, String)>>,
        reject_subject_containing: Option<String>,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, subject: &str, _body: &str, recipient: &str) -> Result<(), NotifyError> {
            if let Some(needle) = &self.reject_subject_containing {
                if subject.contains(needle.as_str()) {
                    return Err(NotifyError::Unreachable);
                }
            }
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), recipient.to_string()));
            Ok(())
        }
    }

    fn closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 20.0 + (i as f64 * 0.2).cos()).collect()
    }

    fn fetcher() -> StubFetcher {
        let mut data = HashMap::new();
        data.insert("IONQ".to_string(), Canned::Closes(closes(250)));
        data.insert("XTIA".to_string(), Canned::Unreachable);
        data.insert("RGTI".to_string(), Canned::Closes(closes(30)));
        data.insert("SES".to_string(), Canned::Empty);
        StubFetcher { data }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_batch() {
        let report = run_batch(
            &symbols(&["XTIA", "IONQ", "SES", "GHOST", "RGTI"]),
            "1y",
            &fetcher(),
            &AnalyzerImpl::new(),
            3,
        )
        .await;

        let order: Vec<&str> = report.outcomes.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(order, vec!["XTIA", "IONQ", "SES", "GHOST", "RGTI"]);

        assert!(matches!(
            report.outcomes[0].result,
            Err(SymbolError::Fetch(FetchError::Timeout))
        ));
        assert!(report.outcomes[1].result.is_ok());
        assert!(matches!(
            report.outcomes[2].result,
            Err(SymbolError::Analysis(AnalysisError::InvalidInput(_)))
        ));
        assert!(matches!(
            report.outcomes[3].result,
            Err(SymbolError::Fetch(FetchError::NoData(_)))
        ));

        // 30 bars: buy range defined, long averages not.
        let young = report.outcomes[4].result.as_ref().unwrap();
        assert!(young.buy_range.lower.is_some());
        assert!(young.snapshot.sma_50.is_none());

        assert_eq!(report.succeeded().count(), 2);
        assert_eq!(report.failed().count(), 3);
    }

    #[tokio::test]
    async fn sequential_and_parallel_runs_agree() {
        let list = symbols(&["IONQ", "RGTI", "XTIA"]);
        let analyzer = AnalyzerImpl::new();
        let one = run_batch(&list, "1y", &fetcher(), &analyzer, 1).await;
        let many = run_batch(&list, "1y", &fetcher(), &analyzer, 8).await;
        for (a, b) in one.outcomes.iter().zip(many.outcomes.iter()) {
            assert_eq!(a.symbol, b.symbol);
            assert_eq!(a.result.as_ref().ok(), b.result.as_ref().ok());
        }
    }

    #[tokio::test]
    async fn delivers_once_per_trading_day() {
        let report = run_batch(
            &symbols(&["IONQ", "XTIA", "RGTI"]),
            "1y",
            &fetcher(),
            &AnalyzerImpl::new(),
            2,
        )
        .await;
        let notifier = RecordingNotifier::default();
        let storage = Mutex::new(SqliteStorage::open_in_memory().unwrap());

        let first = deliver(&report, &notifier, "42", &storage).await;
        assert_eq!(first, DeliveryStats { sent: 2, skipped: 0, failed: 0 });

        let second = deliver(&report, &notifier, "42", &storage).await;
        assert_eq!(second, DeliveryStats { sent: 0, skipped: 2, failed: 0 });

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].0.starts_with("Buy range for IONQ: $"));
        assert_eq!(sent[0].1, "42");
    }

    #[tokio::test]
    async fn failed_delivery_is_retried_next_run() {
        let report = run_batch(
            &symbols(&["IONQ", "RGTI"]),
            "1y",
            &fetcher(),
            &AnalyzerImpl::new(),
            2,
        )
        .await;
        let flaky = RecordingNotifier {
            reject_subject_containing: Some("IONQ".into()),
            ..Default::default()
        };
        let storage = Mutex::new(SqliteStorage::open_in_memory().unwrap());

        let stats = deliver(&report, &flaky, "42", &storage).await;
        assert_eq!(stats, DeliveryStats { sent: 1, skipped: 0, failed: 1 });

        let healthy = RecordingNotifier::default();
        let stats = deliver(&report, &healthy, "42", &storage).await;
        assert_eq!(stats, DeliveryStats { sent: 1, skipped: 1, failed: 0 });
    }
}
