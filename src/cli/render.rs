//! Terminal rendering of feed entries.

use ledgerfeed::model::{FeedEntry, Millis};

/// Summary block for feed listings; `full` also prints the body.
pub fn format_entry(entry: &FeedEntry, gateway: Option<&str>, full: bool) -> String {
    let mut out = format!(
        "#{} {}\n  by {} at {}\n",
        entry.sequence_index,
        entry.title,
        entry.author.truncated(),
        format_timestamp(entry.timestamp),
    );

    if entry.is_degraded() {
        out.push_str("  [content unavailable]\n");
    } else {
        out.push_str(&format!(
            "  credibility {} ({})\n",
            entry.credibility_score.percent(),
            entry.credibility_score.verdict()
        ));
    }

    match gateway {
        Some(gateway) => out.push_str(&format!("  {}\n", entry.content_ref.gateway_url(gateway))),
        None => out.push_str(&format!("  {}\n", entry.content_ref)),
    }

    if full && !entry.body.is_empty() {
        out.push('\n');
        for line in entry.body.lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }

    out
}

/// Epoch milliseconds rendered as fractional seconds.
fn format_timestamp(timestamp: Millis) -> String {
    format!("{}.{:03}s", timestamp / 1000, timestamp % 1000)
}
