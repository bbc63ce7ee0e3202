use super::render::format_entry;
use ledgerfeed::config::LedgerfeedConfig;
use ledgerfeed::model::ContentRef;
use ledgerfeed::Newsroom;

/// Show a single entry, body included
pub async fn execute(
    newsroom: &Newsroom,
    config: &LedgerfeedConfig,
    content_ref: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let entry = newsroom.get_entry(&ContentRef::new(content_ref)).await?;
    print!("{}", format_entry(&entry, config.store.gateway.as_deref(), true));
    Ok(())
}
