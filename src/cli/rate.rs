use super::ui;
use crate::core::format::{DisplayFormatter, format_timestamp};
use crate::core::{ExchangeRate, RateProvider};
use anyhow::{Result, bail};

/// Two line summary of one rate: the formatted value and when it was fetched.
pub fn display_rate(rate: &ExchangeRate, formatter: &DisplayFormatter) -> String {
    format!(
        "{} → {}: {}\n{}",
        rate.from,
        rate.to,
        ui::style_text(
            &formatter.format_amount(rate.rate, &rate.to),
            ui::StyleType::Value
        ),
        ui::style_text(
            &format!("Last updated: {}", format_timestamp(rate.timestamp)),
            ui::StyleType::Subtle
        ),
    )
}

pub async fn run(
    provider: &RateProvider,
    formatter: &DisplayFormatter,
    from: &str,
    to: &str,
) -> Result<()> {
    match provider.get_rate(from, to).await {
        Some(rate) => {
            println!("{}", display_rate(&rate, formatter));
            Ok(())
        }
        None => {
            println!(
                "{}",
                ui::style_text("Unable to fetch exchange rate", ui::StyleType::Error)
            );
            bail!("Unable to fetch exchange rate for {from} -> {to}")
        }
    }
}
