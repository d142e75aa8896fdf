use super::ui;
use crate::core::format::{DisplayFormatter, format_age, format_timestamp};
use crate::core::{ExchangeRate, RateCache};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color};

/// Table of cached rates in the order given, with their age relative to `now`.
pub fn display_as_table(
    rates: &[ExchangeRate],
    formatter: &DisplayFormatter,
    now: DateTime<Utc>,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Rate"),
        ui::header_cell("Last Updated"),
        ui::header_cell("Age"),
    ]);

    for rate in rates {
        table.add_row(vec![
            Cell::new(formatter.label(&rate.from)),
            Cell::new(formatter.label(&rate.to)),
            ui::rate_cell(formatter.format_amount(rate.rate, &rate.to)),
            Cell::new(format_timestamp(rate.timestamp)),
            Cell::new(format_age(rate.timestamp, now)).fg(Color::DarkGrey),
        ]);
    }

    table.to_string()
}

/// Prints every cached rate, newest first. Never touches the network.
pub async fn run(cache: &RateCache, formatter: &DisplayFormatter) -> Result<()> {
    let rates = cache.list().await;
    if rates.is_empty() {
        println!(
            "{}",
            ui::style_text("No cached exchange rates", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    println!(
        "{}\n\n{}",
        ui::style_text("Cached Exchange Rates", ui::StyleType::Title),
        display_as_table(&rates, formatter, Utc::now())
    );
    Ok(())
}
