use std::path::PathBuf;

use clap::{ArgAction, Args, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "jobwatch", about = "Job board monitor and posting query API")]
pub struct Config {
    /// Database connection URL (not needed with --dry-run)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Run database migrations on startup
    #[arg(long, env = "RUN_MIGRATIONS", default_value = "true", action = ArgAction::Set)]
    pub run_migrations: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Where site adapters come from and how detail pages are fetched.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// JSON file of site configurations replacing the built-in boards
    #[arg(long, env = "SITES_FILE")]
    pub sites_file: Option<PathBuf>,

    /// Page fetch timeout in seconds
    #[arg(long, env = "DETAIL_TIMEOUT", default_value = "10")]
    pub detail_timeout: u64,

    /// Pause between detail fetches in milliseconds
    #[arg(long, env = "PAUSE_MS", default_value = "4000")]
    pub pause_ms: u64,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the query API server (default when no subcommand given)
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen_addr: String,
    },
    /// Run the scrape loop over every configured site
    Scrape {
        /// Seconds between passes
        #[arg(long, env = "SCRAPE_INTERVAL", default_value = "900")]
        interval: u64,

        /// Run a single pass and exit
        #[arg(long)]
        once: bool,

        /// Discord-compatible webhook for new postings; logs only when absent
        #[arg(long, env = "DISCORD_WEBHOOK")]
        webhook_url: Option<String>,

        /// Keep postings in memory and only log notifications
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Re-fetch stored postings of one site and merge re-extracted attributes
    Reanalyze {
        /// Site identifier
        #[arg(long)]
        site: String,

        #[command(flatten)]
        source: SourceArgs,
    },
}

impl Config {
    /// Resolve the command, defaulting to Serve if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_defaults() {
        let config = Config::try_parse_from(["jobwatch", "scrape", "--dry-run", "--once"]).unwrap();
        match config.resolved_command() {
            Command::Scrape {
                interval,
                once,
                dry_run,
                source,
                ..
            } => {
                assert_eq!(interval, 900);
                assert!(once);
                assert!(dry_run);
                assert_eq!(source.detail_timeout, 10);
                assert_eq!(source.pause_ms, 4000);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn reanalyze_requires_site() {
        assert!(Config::try_parse_from(["jobwatch", "reanalyze"]).is_err());
        let config =
            Config::try_parse_from(["jobwatch", "reanalyze", "--site", "wttj", "--pause-ms", "0"])
                .unwrap();
        assert!(matches!(
            config.resolved_command(),
            Command::Reanalyze { site, source } if site == "wttj" && source.pause_ms == 0
        ));
    }

    #[test]
    fn migrations_can_be_disabled() {
        let config =
            Config::try_parse_from(["jobwatch", "--run-migrations", "false", "scrape"]).unwrap();
        assert!(!config.run_migrations);
    }
}
