use super::{show, ui};
use crate::core::config::CurrencyPair;
use crate::core::format::DisplayFormatter;
use crate::core::refresh::RefreshTask;
use crate::core::{ExchangeRate, RateProvider};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn refresh_line(
    pair: &CurrencyPair,
    rate: Option<&ExchangeRate>,
    formatter: &DisplayFormatter,
) -> String {
    match rate {
        Some(rate) => format!(
            "{} → {}: {}",
            pair.from,
            pair.to,
            ui::style_text(
                &formatter.format_amount(rate.rate, &pair.to),
                ui::StyleType::Value
            )
        ),
        None => format!(
            "{} → {}: {}",
            pair.from,
            pair.to,
            ui::style_text("Unable to fetch exchange rate", ui::StyleType::Error)
        ),
    }
}

/// Shows all pairs, then refreshes them every `period` until Ctrl-C.
pub async fn run(
    provider: Arc<RateProvider>,
    pairs: Vec<CurrencyPair>,
    formatter: Arc<DisplayFormatter>,
    period: Duration,
) -> Result<()> {
    show::run(&provider, &pairs, &formatter).await?;
    if pairs.is_empty() {
        return Ok(());
    }

    info!("Refreshing {} pairs every {:?}", pairs.len(), period);
    let task = RefreshTask::spawn(provider, pairs, period, move |pair, rate| {
        println!("{}", refresh_line(pair, rate, &formatter));
    });

    let signal = tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C");
    task.stop().await;
    signal
}
