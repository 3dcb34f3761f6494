// Result rendering: fixed-width table or JSON lines

use crate::experiment::stats::AggregateRow;
use clap::ValueEnum;
use std::io::Write;

/// Output format for sweep rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table with thousands-grouped integers
    #[default]
    Table,
    /// One JSON object per row
    Json,
}

/// Insert `,` every three digits: 1234567 -> "1,234,567"
pub fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Writes rows to an output sink, flushing after each one
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Two-line column header (table format only)
    pub fn write_header(&mut self) -> Result<(), String> {
        if self.format == OutputFormat::Table {
            writeln!(
                self.out,
                "{:>11} {:>18} {:>15} {:>15} {:>15} {:>10} {:>10}",
                "#solutions", "samples", "min(ns)", "max(ns)", "avg(ns)", "min", "max"
            )
            .and_then(|_| {
                writeln!(
                    self.out,
                    "{:>11} {:>18} {:>15} {:>15} {:>15} {:>10} {:>10}\n",
                    "", "", "", "", "", "% of avg", "% of avg"
                )
            })
            .map_err(|e| format!("Failed to write header: {}", e))?;
        }
        self.flush()
    }

    pub fn write_row(&mut self, row: &AggregateRow) -> Result<(), String> {
        match self.format {
            OutputFormat::Table => writeln!(
                self.out,
                "{:>11} {:>18} {:>15} {:>15} {:>15} {:>9.2}% {:>9.2}%",
                row.solutions,
                group_thousands(u128::from(row.samples)),
                group_thousands(row.min_ns),
                group_thousands(row.max_ns),
                group_thousands(row.avg_ns),
                row.min_percent,
                row.max_percent
            )
            .map_err(|e| format!("Failed to write row: {}", e))?,
            OutputFormat::Json => {
                let line = serde_json::to_string(row)
                    .map_err(|e| format!("Failed to serialize row: {}", e))?;
                writeln!(self.out, "{}", line)
                    .map_err(|e| format!("Failed to write row: {}", e))?;
            }
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<(), String> {
        self.out
            .flush()
            .map_err(|e| format!("Failed to flush output: {}", e))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
