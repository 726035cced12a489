use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Turns `span` into a spinner. The span must carry `indicatif.pb_show`.
pub fn attach(span: &Span, message: &str) {
    span.pb_set_style(&spinner_style());
    span.pb_set_message(message);
}

pub fn report_progress(span: &Span, records: usize) {
    let message: String = format!(
        "Collected {} so far...",
        format!("{records} records").green().bold()
    )
    .color(colors::TEXT_DEFAULT)
    .to_string();
    span.pb_set_message(&message);
}
