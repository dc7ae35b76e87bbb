use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a stored document into one or more locales
    Translate {
        /// Collection slug
        #[arg(long)]
        collection: String,

        /// Document identifier
        #[arg(long)]
        id: String,

        /// Locale the document is read in
        #[arg(short, long)]
        source: String,

        /// Target locales (comma-separated)
        #[arg(short, long)]
        targets: String,
    },

    /// Print the translatable fragments of a document as JSON
    Extract {
        /// Collection schema file
        #[arg(long)]
        schema: PathBuf,

        /// Document file
        #[arg(short, long)]
        document: PathBuf,
    },

    /// Write a JSON array of translations back into a document
    Apply {
        /// Collection schema file
        #[arg(long)]
        schema: PathBuf,

        /// Source document file
        #[arg(short, long)]
        document: PathBuf,

        /// JSON array of translated texts, in extraction order
        #[arg(short, long)]
        translations: PathBuf,

        /// Output document file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check that the configured translation provider is reachable
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Output configuration file
        #[arg(short, long, default_value = "relocale.toml")]
        output: PathBuf,
    },
}

/// Split a comma-separated locale list, dropping blanks
pub fn parse_locales(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locales() {
        assert_eq!(parse_locales("es, fr,,de "), vec!["es", "fr", "de"]);
        assert!(parse_locales("").is_empty());
    }

    #[test]
    fn test_translate_command_parses() {
        let args = Args::try_parse_from([
            "relocale", "--verbose", "translate", "--collection", "posts", "--id", "7", "-s", "en", "-t", "es,fr",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Commands::Translate { collection, id, source, targets } => {
                assert_eq!(collection, "posts");
                assert_eq!(id, "7");
                assert_eq!(source, "en");
                assert_eq!(parse_locales(&targets), vec!["es", "fr"]);
            }
            _ => panic!("expected translate"),
        }
    }
}
