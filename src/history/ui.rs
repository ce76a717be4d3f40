//! Text formatting for history listings.

use super::models::{ExchangeRequest, ExchangeResponse, HistoryEntry};
use chrono::{DateTime, Local, Utc};

/// Formats history entries as numbered one-line summaries.
///
/// Each line reads `INDEX: METHOD endpointuri`, where `INDEX` is what
/// `spag history show` accepts.
///
/// # Example
///
/// ```ignore
/// for line in format_history_list(&history.load()?) {
///     println!("{}", line);
/// }
/// ```
pub fn format_history_list(entries: &[HistoryEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| format!("{}: {}", index, format_history_summary(entry)))
        .collect()
}

/// `METHOD endpointuri`
pub fn format_history_summary(entry: &HistoryEntry) -> String {
    format!(
        "{} {}{}",
        entry.request.method, entry.request.endpoint, entry.request.uri
    )
}

/// Formats a history entry with its full request and response.
pub fn format_history_entry(entry: &HistoryEntry) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:-^50}\n", " Request "));
    output.push_str(&format!("Recorded {}\n", format_timestamp(&entry.recorded_at)));
    push_request(&mut output, &entry.request);

    output.push_str(&format!("{:-^50}\n", " Response "));
    push_response(&mut output, &entry.response);

    output
}

fn push_request(output: &mut String, request: &ExchangeRequest) {
    output.push_str(&format!(
        "{} {}{}\n",
        request.method, request.endpoint, request.uri
    ));
    for (key, value) in &request.headers {
        output.push_str(&format!("{}: {}\n", key, value));
    }
    if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
        output.push_str(&format!("Body:\n{}\n", body));
    }
}

fn push_response(output: &mut String, response: &ExchangeResponse) {
    output.push_str(&format!("Status code {}\n", response.status));
    for (key, value) in &response.headers {
        output.push_str(&format!("{}: {}\n", key, value));
    }
    if !response.body.is_empty() {
        output.push_str(&format!("Body:\n{}\n", response.body));
    }
}

/// Formats a timestamp in local time for display.
///
/// Format: "YYYY-MM-DD HH:MM:SS"
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    let local: DateTime<Local> = timestamp.with_timezone(&Local);
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}
