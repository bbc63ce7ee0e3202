use clap::{ArgGroup, Parser, Subcommand};
use ledgerfeed::config::{default_config_path, LedgerfeedConfig};
use ledgerfeed::Newsroom;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod feed;
pub mod init_config;
pub mod render;
pub mod show;
pub mod submit;
pub mod version;

#[derive(Parser)]
#[command(name = "ledgerfeed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Submit and browse ledger-indexed news", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/ledgerfeed/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score, store and index a new article
    #[command(group(ArgGroup::new("content").required(true).args(["body", "file", "link"])))]
    Submit {
        /// Article title
        #[arg(long)]
        title: String,

        /// Article text
        #[arg(long)]
        body: Option<String>,

        /// Attach a file instead of text (recorded by name)
        #[arg(long)]
        file: Option<String>,

        /// Submit an external link instead of text
        #[arg(long)]
        link: Option<String>,
    },

    /// List the feed, newest first
    Feed {
        /// Case-insensitive search over title and body
        #[arg(long)]
        search: Option<String>,

        /// Only entries scored as likely true
        #[arg(long, conflicts_with = "unverified")]
        verified: bool,

        /// Only entries below the verified threshold
        #[arg(long)]
        unverified: bool,

        /// Minimum credibility score (0.0 - 1.0)
        #[arg(long)]
        min_score: Option<f64>,

        /// Keep running and print entries as they are committed
        #[arg(long)]
        follow: bool,
    },

    /// Show one entry by content reference
    Show {
        /// Content reference, e.g. sha256://<hash> or ipfs://<cid>
        content_ref: String,
    },

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match cli.command {
        Commands::InitConfig { force } => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"));
            init_config::execute(&config_path, force)
        }
        Commands::Version => {
            version::execute();
            Ok(())
        }
        command => {
            let config = LedgerfeedConfig::load(&config_path)?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));
            let newsroom = Newsroom::new(config.backends()?, config.settings());

            match command {
                Commands::Submit {
                    title,
                    body,
                    file,
                    link,
                } => submit::execute(&newsroom, &config, title, body, file, link).await,
                Commands::Feed {
                    search,
                    verified,
                    unverified,
                    min_score,
                    follow,
                } => {
                    feed::execute(
                        &newsroom, &config, search, verified, unverified, min_score, follow,
                    )
                    .await
                }
                Commands::Show { content_ref } => show::execute(&newsroom, &config, content_ref).await,
                Commands::InitConfig { .. } | Commands::Version => Ok(()),
            }
        }
    }
}

/// Logs go to stderr so command output stays clean; `RUST_LOG` wins over `level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_submit_text() {
        let cli = Cli::parse_from(["ledgerfeed", "submit", "--title", "A", "--body", "B"]);

        match cli.command {
            Commands::Submit {
                title,
                body,
                file,
                link,
            } => {
                assert_eq!(title, "A");
                assert_eq!(body, Some("B".to_string()));
                assert!(file.is_none());
                assert!(link.is_none());
            }
            _ => panic!("Expected Submit command"),
        }
    }

    #[test]
    fn test_cli_submit_requires_exactly_one_content() {
        assert!(Cli::try_parse_from(["ledgerfeed", "submit", "--title", "A"]).is_err());
        assert!(Cli::try_parse_from([
            "ledgerfeed",
            "submit",
            "--title",
            "A",
            "--body",
            "B",
            "--link",
            "https://example.org"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_parse_feed_defaults() {
        let cli = Cli::parse_from(["ledgerfeed", "feed"]);

        match cli.command {
            Commands::Feed {
                search,
                verified,
                unverified,
                min_score,
                follow,
            } => {
                assert!(search.is_none());
                assert!(!verified);
                assert!(!unverified);
                assert!(min_score.is_none());
                assert!(!follow);
            }
            _ => panic!("Expected Feed command"),
        }
    }

    #[test]
    fn test_cli_parse_feed_with_filters() {
        let cli = Cli::parse_from([
            "ledgerfeed",
            "--config",
            "/etc/ledgerfeed.toml",
            "feed",
            "--search",
            "flood",
            "--verified",
            "--min-score",
            "0.6",
        ]);

        assert_eq!(cli.config, Some("/etc/ledgerfeed.toml".to_string()));
        match cli.command {
            Commands::Feed {
                search,
                verified,
                min_score,
                ..
            } => {
                assert_eq!(search, Some("flood".to_string()));
                assert!(verified);
                assert_eq!(min_score, Some(0.6));
            }
            _ => panic!("Expected Feed command"),
        }
    }

    #[test]
    fn test_cli_feed_verified_conflicts_with_unverified() {
        assert!(Cli::try_parse_from(["ledgerfeed", "feed", "--verified", "--unverified"]).is_err());
    }

    #[test]
    fn test_cli_parse_show() {
        let cli = Cli::parse_from(["ledgerfeed", "show", "sha256://abc"]);

        match cli.command {
            Commands::Show { content_ref } => assert_eq!(content_ref, "sha256://abc"),
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_cli_parse_init_config() {
        let cli = Cli::parse_from(["ledgerfeed", "init-config", "--force"]);
        assert!(matches!(cli.command, Commands::InitConfig { force: true }));
    }

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::parse_from(["ledgerfeed", "version"]);
        assert!(matches!(cli.command, Commands::Version));
    }
}
