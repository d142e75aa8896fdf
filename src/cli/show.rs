use super::ui;
use crate::core::config::CurrencyPair;
use crate::core::format::{DisplayFormatter, format_timestamp};
use crate::core::{ExchangeRate, RateProvider};
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;

/// Outcome of one lookup in a `show` round.
pub struct PairRate {
    pub pair: CurrencyPair,
    pub rate: Option<ExchangeRate>,
}

/// Looks up every pair. Lookups for different pairs run concurrently.
pub async fn fetch_all(provider: &RateProvider, pairs: &[CurrencyPair]) -> Vec<PairRate> {
    let pb = ui::new_progress_bar(pairs.len() as u64);
    pb.set_message("Fetching rates...");

    let futures = pairs.iter().map(|pair| {
        let pb_clone = pb.clone();
        async move {
            let rate = provider.get_rate(&pair.from, &pair.to).await;
            pb_clone.inc(1);
            PairRate {
                pair: pair.clone(),
                rate,
            }
        }
    });

    let results = join_all(futures).await;
    pb.finish_and_clear();
    results
}

pub fn display_as_table(results: &[PairRate], formatter: &DisplayFormatter) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Rate"),
        ui::header_cell("Last Updated"),
    ]);

    for result in results {
        let pair = &result.pair;
        let (rate, updated) = match &result.rate {
            Some(rate) => (
                ui::rate_cell(formatter.format_amount(rate.rate, &pair.to)),
                Cell::new(format_timestamp(rate.timestamp)),
            ),
            None => (ui::na_cell(), Cell::new("Unable to fetch exchange rate")),
        };
        table.add_row(vec![Cell::new(&pair.from), Cell::new(&pair.to), rate, updated]);
    }

    table.to_string()
}

pub async fn run(
    provider: &RateProvider,
    pairs: &[CurrencyPair],
    formatter: &DisplayFormatter,
) -> Result<()> {
    if pairs.is_empty() {
        println!(
            "{}",
            ui::style_text("No currency pairs configured", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let results = fetch_all(provider, pairs).await;
    println!(
        "{}\n\n{}",
        ui::style_text("Exchange Rates", ui::StyleType::Title),
        display_as_table(&results, formatter)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateCache;
    use crate::core::fetch::{FetchError, RateFetch};
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;

    struct OnlyUsdFetcher;

    #[async_trait]
    impl RateFetch for OnlyUsdFetcher {
        async fn fetch(&self, from: &str, to: &str) -> Result<ExchangeRate, FetchError> {
            if from == "USD" {
                Ok(ExchangeRate::new(from, to, 35.12, Utc::now()))
            } else {
                Err(FetchError::MissingRate {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_pair_order_and_failures() {
        let cache = RateCache::new(Arc::new(MemoryStore::new()));
        let provider = RateProvider::new(cache, Arc::new(OnlyUsdFetcher), chrono::Duration::minutes(60));
        let pairs = vec![
            CurrencyPair::new("USD", "THB"),
            CurrencyPair::new("EUR", "THB"),
        ];

        let results = fetch_all(&provider, &pairs).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].pair, pairs[0]);
        assert_eq!(results[0].rate.as_ref().map(|r| r.rate), Some(35.12));
        assert_eq!(results[1].pair, pairs[1]);
        assert!(results[1].rate.is_none());

        let table = display_as_table(&results, &DisplayFormatter::default());
        assert!(table.contains("฿35.1200"));
        assert!(table.contains("N/A"));
        assert!(table.contains("Unable to fetch exchange rate"));
    }
}
