use crate::terminal::colors;
use colored::*;
use subscout_common::models::record::EnrichmentRecord;

pub type Detail = (String, ColoredString);

pub fn status_color(status: u16) -> Color {
    match status {
        200..=299 => colors::STATUS_OK,
        300..=399 => colors::STATUS_REDIRECT,
        _ => colors::STATUS_ERROR,
    }
}

/// `[+] http://www.example.com (200)`, coloured by status class.
pub fn record_line(record: &EnrichmentRecord) -> String {
    format!(
        "{} {} ({})",
        "[+]".green().bold(),
        record.url.color(colors::PRIMARY),
        record.status.to_string().color(status_color(record.status))
    )
}

fn or_empty(value: Option<&str>) -> ColoredString {
    match value {
        Some(text) if !text.is_empty() => text.color(colors::TEXT_DEFAULT),
        _ => "-".color(colors::EMPTY),
    }
}

/// Key/value pairs shown beneath a record in the final listing.
pub fn record_details(record: &EnrichmentRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("IP".to_string(), record.ip.to_string().color(colors::IP_ADDR)),
        ("PTR".to_string(), or_empty(record.reverse_dns.as_deref())),
        (
            "Status".to_string(),
            record.status.to_string().color(status_color(record.status)),
        ),
        ("Title".to_string(), or_empty(record.title.as_deref())),
        ("Server".to_string(), or_empty(record.server_header.as_deref())),
        (
            "Length".to_string(),
            format!("{} bytes", record.length).color(colors::TEXT_DEFAULT),
        ),
    ];

    if !record.open_ports.is_empty() {
        let ports: String = record
            .open_ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<String>>()
            .join(", ");
        details.push(("Ports".to_string(), ports.color(colors::ACCENT)));
    }

    if !record.ssl_sans.is_empty() {
        details.push((
            "SANs".to_string(),
            record.ssl_sans.join(", ").color(colors::TEXT_DEFAULT),
        ));
    }

    for (port, banner) in &record.banners {
        let first_line: &str = banner.lines().next().unwrap_or_default();
        details.push((format!("Banner {port}"), first_line.color(colors::TEXT_DEFAULT)));
    }

    details
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
