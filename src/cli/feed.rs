use super::render::format_entry;
use futures::StreamExt;
use ledgerfeed::config::LedgerfeedConfig;
use ledgerfeed::pipeline::{FeedFilter, VerificationFilter};
use ledgerfeed::Newsroom;
use std::time::Duration;
use tracing::warn;

/// List the feed, then optionally follow new commits
pub async fn execute(
    newsroom: &Newsroom,
    config: &LedgerfeedConfig,
    search: Option<String>,
    verified: bool,
    unverified: bool,
    min_score: Option<f64>,
    follow: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter(search, verified, unverified, min_score)?;
    let gateway = config.store.gateway.as_deref();

    let snapshot = newsroom.list_feed_snapshot(&filter).await?;
    if snapshot.entries.is_empty() {
        println!("No entries.");
    }
    for entry in &snapshot.entries {
        println!("{}", format_entry(entry, gateway, false));
    }

    if !follow {
        return Ok(());
    }

    println!("Waiting for new entries (Ctrl-C to stop)...");
    let poll_interval = Duration::from_millis(config.ledger.poll_interval_ms);
    let updates = newsroom.follow_from(snapshot.next_index, poll_interval);
    futures::pin_mut!(updates);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            next = updates.next() => match next {
                Some(Ok(entry)) if filter.matches(&entry) => {
                    println!("{}", format_entry(&entry, gateway, false));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => warn!(error = %e, "ledger poll failed"),
                None => return Ok(()),
            },
        }
    }
}

fn build_filter(
    search: Option<String>,
    verified: bool,
    unverified: bool,
    min_score: Option<f64>,
) -> Result<FeedFilter, Box<dyn std::error::Error>> {
    if let Some(min) = min_score {
        if !(0.0..=1.0).contains(&min) {
            return Err(format!("--min-score must be between 0 and 1, got {}", min).into());
        }
    }

    let verification = match (verified, unverified) {
        (true, false) => VerificationFilter::Verified,
        (false, true) => VerificationFilter::Unverified,
        (false, false) => VerificationFilter::All,
        (true, true) => return Err("--verified and --unverified are exclusive".into()),
    };

    Ok(FeedFilter {
        search,
        min_score,
        verification,
    })
}
