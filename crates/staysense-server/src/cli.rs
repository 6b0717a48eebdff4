use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "staysense")]
#[command(author, version, about = "Hotel review sentiment service and trainer")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve predictions over HTTP from a trained model directory
    Serve {
        /// Configuration file path
        #[arg(short, long, default_value = "staysense.yaml")]
        config: String,

        /// Model artifacts directory
        #[arg(short, long, env = "STAYSENSE_ARTIFACTS")]
        artifacts: Option<PathBuf>,

        /// Score with a remote model server instead of the saved oracle
        #[arg(long)]
        oracle_url: Option<String>,

        /// Listen address
        #[arg(short, long)]
        listen: Option<String>,

        /// Listen port
        #[arg(short = 'P', long)]
        port: Option<u16>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Train a model from a JSON Lines corpus and write its artifacts
    Train {
        /// Corpus of {"review": ..., "rating": ...} lines
        #[arg(short, long)]
        corpus: PathBuf,

        /// Output directory for artifacts
        #[arg(short, long, default_value = "saved_model")]
        output: PathBuf,

        /// Training configuration (YAML)
        #[arg(long)]
        training_config: Option<PathBuf>,

        /// Replacement normalizer tables (YAML)
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["staysense", "serve", "-P", "9000", "--oracle-url", "http://m/score"]);
        match cli.command {
            Commands::Serve {
                port, oracle_url, ..
            } => {
                assert_eq!(port, Some(9000));
                assert_eq!(oracle_url.as_deref(), Some("http://m/score"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
