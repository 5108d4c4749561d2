use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Top-level CLI entry point.
#[derive(Debug, Parser)]
#[command(
    name = "imgscrape",
    version,
    author,
    about = "Download images matching a search query"
)]
pub struct Cli {
    /// Text to search images for.
    pub query: String,
    /// Number of images to download.
    #[arg(short = 'n', long = "count", default_value_t = 10)]
    pub count: u32,
    /// Google API key (falls back to saved credentials).
    #[arg(long, env = "IMGSCRAPE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Programmable Search Engine ID (falls back to saved credentials).
    #[arg(long, env = "IMGSCRAPE_ENGINE_ID")]
    pub engine_id: Option<String>,
    /// Directory where images are written.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,
    /// Remember the given API key and engine ID for later runs.
    #[arg(long)]
    pub save_credentials: bool,
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "imgscrape",
            "red panda",
            "-n",
            "5",
            "--api-key",
            "k",
            "--engine-id",
            "e",
            "--out",
            "pics",
            "--save-credentials",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.query, "red panda");
        assert_eq!(cli.count, 5);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(cli.engine_id.as_deref(), Some("e"));
        assert_eq!(cli.out, PathBuf::from("pics"));
        assert!(cli.save_credentials);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_negative_count_is_rejected() {
        assert!(Cli::try_parse_from(["imgscrape", "cats", "-n", "-3"]).is_err());
    }
}
