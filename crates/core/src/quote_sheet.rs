//! Quote Sheet
//!
//! Terminal rendering of an [`EstimateResponse`]: one table row per line item followed by the
//! totals, margin and any notes.

use std::io;

use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cost::{CostAmount, CostBreakdown},
    estimate::{EstimateResponse, EstimateStatus},
    money::fraction,
};

/// Errors that can occur when writing a quote sheet.
#[derive(Debug, Error)]
pub enum QuoteSheetError {
    /// IO error
    #[error("IO error")]
    IO,
}

impl EstimateResponse {
    /// Writes the quote sheet.
    ///
    /// Blocked responses are written as a single line with the reason.
    ///
    /// # Errors
    ///
    /// Returns an error if the output can't be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), QuoteSheetError> {
        if self.status() == EstimateStatus::Blocked {
            return writeln!(
                out,
                "\n Blocked: {}\n",
                self.blocked_reason().unwrap_or("no reason given")
            )
            .map_err(|_err| QuoteSheetError::IO);
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Total", "Rule"]);

        for (idx, line) in self.line_items().iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.description().to_string(),
                line.qty().to_string(),
                format!("{}", line.unit_price()),
                format!("{}", line.line_total()),
                line.rule_id().to_string(),
            ]);
        }

        write_table(&mut out, builder)?;
        write_summary(&mut out, self)?;

        Ok(())
    }
}

fn write_table(out: &mut impl io::Write, builder: Builder) -> Result<(), QuoteSheetError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());
    table.modify(Columns::last(), Color::new(DARK_GREY, RESET));

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| QuoteSheetError::IO)
}

fn write_summary(
    out: &mut impl io::Write,
    response: &EstimateResponse,
) -> Result<(), QuoteSheetError> {
    let mut rows: Vec<(String, String)> = Vec::with_capacity(6);

    if let Some(sell_price) = response.sell_price() {
        rows.push((" Subtotal:".to_string(), format!("{sell_price}  ")));
    }

    if let Some(gst) = response.gst() {
        rows.push((" GST:".to_string(), format!("{gst}  ")));
    }

    if let Some(total) = response.total_with_tax() {
        rows.push((
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{total}  \x1b[0m"),
        ));
    }

    match response.cost().map(CostBreakdown::total) {
        Some(CostAmount::Confirmed(cost)) => rows.push((" Cost:".to_string(), format!("{cost}  "))),
        Some(CostAmount::Unconfirmed) => {
            rows.push((" Cost:".to_string(), "unconfirmed  ".to_string()));
        }
        None => {}
    }

    if let Some(margin) = response.margin() {
        rows.push((" Margin:".to_string(), format!("{}%  ", percent_points(fraction(margin)))));
    }

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    for note in response.clarifications() {
        writeln!(out, " Note: {note}").map_err(|_err| QuoteSheetError::IO)?;
    }

    writeln!(out).map_err(|_err| QuoteSheetError::IO)
}

fn percent_points(value: Decimal) -> Decimal {
    (value * Decimal::ONE_HUNDRED).round_dp(2)
}

const DARK_GREY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

/// Greys out the table borders (box-drawing characters, U+2500..U+257F).
fn colorize_borders(table: &str) -> String {
    let is_border = |ch: char| ('\u{2500}'..='\u{257F}').contains(&ch);
    let mut out = String::with_capacity(table.len() + 256);
    let mut grey = false;

    for ch in table.chars() {
        if is_border(ch) != grey {
            grey = !grey;
            out.push_str(if grey { DARK_GREY } else { RESET });
        }

        out.push(ch);
    }

    if grey {
        out.push_str(RESET);
    }

    out
}

/// Printable width of a string, skipping ANSI escape sequences.
fn visible_width(s: &str) -> usize {
    s.chars()
        .scan(false, |in_escape, ch| {
            let printable = match (*in_escape, ch) {
                (false, '\x1b') => {
                    *in_escape = true;
                    false
                }
                (false, _) => true,
                (true, ch) => {
                    *in_escape = !ch.is_ascii_alphabetic();
                    false
                }
            };

            Some(printable)
        })
        .filter(|printable| *printable)
        .count()
}

/// One summary row: label right-aligned to `label_width`, value right-aligned to `value_width`.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_width: usize,
    value_width: usize,
) -> Result<(), QuoteSheetError> {
    let label_pad = " ".repeat(label_width.saturating_sub(visible_width(label)));
    let value_pad = " ".repeat(value_width.saturating_sub(visible_width(value)));

    writeln!(out, "{label_pad}{label}  {value_pad}{value}").map_err(|_err| QuoteSheetError::IO)
}
