use super::render::format_entry;
use ledgerfeed::config::LedgerfeedConfig;
use ledgerfeed::pipeline::Submission;
use ledgerfeed::Newsroom;

/// Submit one article and wait for the ledger to finalize it
pub async fn execute(
    newsroom: &Newsroom,
    config: &LedgerfeedConfig,
    title: String,
    body: Option<String>,
    file: Option<String>,
    link: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let submission = build_submission(title, body, file, link)?;

    let author = newsroom
        .current_author()
        .ok_or("No identity bound. Set [identity] address in the config file.")?;
    println!("Submitting as {}...", author.truncated());

    let receipt = newsroom.submit(&submission).await?;

    println!(
        "Committed at index {} with credibility {} ({})",
        receipt.sequence_index,
        receipt.credibility_score.percent(),
        receipt.credibility_score.verdict()
    );

    match newsroom.get_entry(&receipt.content_ref).await {
        Ok(entry) => print!("{}", format_entry(&entry, config.store.gateway.as_deref(), false)),
        Err(_) => println!("  {}", receipt.content_ref),
    }

    Ok(())
}

fn build_submission(
    title: String,
    body: Option<String>,
    file: Option<String>,
    link: Option<String>,
) -> Result<Submission, Box<dyn std::error::Error>> {
    match (body, file, link) {
        (Some(body), None, None) => Ok(Submission::text(title, body)),
        (None, Some(file), None) => {
            let name = std::path::Path::new(&file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(file);
            Ok(Submission::file(title, name))
        }
        (None, None, Some(link)) => Ok(Submission::link(title, link)),
        _ => Err("Exactly one of --body, --file or --link is required".into()),
    }
}
