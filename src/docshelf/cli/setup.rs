use clap::{Parser, Subcommand};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2026-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "docshelf", bin_name = "docshelf", version = get_version())]
#[command(about = "Browse a published document manifest offline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the manifest and download missing documents
    Sync {
        /// Do not print per-document progress
        #[arg(short, long)]
        quiet: bool,
    },

    /// Browse the catalog: areas, then types, then documents
    #[command(alias = "ls")]
    List {
        area: Option<String>,
        #[arg(value_name = "TYPE")]
        kind: Option<String>,
    },

    /// Show sync state and cache contents
    Status,

    /// Print the local path of a cached document
    Path {
        /// File name or part of the title
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Print a file:// URL instead of a path
        #[arg(long)]
        url: bool,
    },

    /// Get or set configuration values
    Config {
        key: Option<String>,
        value: Option<String>,
    },

    /// Create the data directory and a default config
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_area_and_type() {
        let cli = Cli::try_parse_from(["docshelf", "ls", "Área 2044", "Plano"]).unwrap();
        match cli.command {
            Some(Commands::List { area, kind }) => {
                assert_eq!(area.as_deref(), Some("Área 2044"));
                assert_eq!(kind.as_deref(), Some("Plano"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn counts_verbosity() {
        let cli = Cli::try_parse_from(["docshelf", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn path_joins_multiple_words() {
        let cli = Cli::try_parse_from(["docshelf", "path", "planta", "alta", "--url"]).unwrap();
        match cli.command {
            Some(Commands::Path { query, url }) => {
                assert_eq!(query, vec!["planta", "alta"]);
                assert!(url);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn path_requires_a_query() {
        assert!(Cli::try_parse_from(["docshelf", "path"]).is_err());
    }
}
