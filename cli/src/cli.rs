use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Compose themes, dream up an image and a narrative, keep the ones you love
#[derive(Parser, Debug)]
#[command(name = "dreamweaver", author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enter interactive mode
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,

    /// Path to the config file (defaults to ~/.config/dreamweaver/config.toml)
    #[arg(short, long, global = true, env = "DREAMWEAVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the journal file
    #[arg(long, global = true, env = "DREAMWEAVER_JOURNAL")]
    pub journal: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Enable verbose output (same as --log-level debug)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a dream from themes (configured defaults when none are given)
    Dream {
        /// Themes to weave into the dream
        themes: Vec<String>,

        /// Save the result to the journal
        #[arg(short, long, default_value_t = false)]
        save: bool,

        /// Write the generated image to this file or directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Browse and manage saved dreams
    Journal {
        #[command(subcommand)]
        command: JournalCommand,
    },

    /// Start an interactive dreaming session
    Interactive,

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
    /// List saved dreams, newest first
    List,
    /// Show one saved dream
    Show { position: usize },
    /// Delete one saved dream
    Delete { position: usize },
    /// Write the image of a saved dream to a file or directory
    Export { position: usize, path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file if none exists
    Init {
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dream_with_themes() {
        let args = Args::try_parse_from([
            "dreamweaver",
            "dream",
            "Floating island",
            "Neon desert",
            "--save",
        ])
        .unwrap();
        match args.command {
            Some(Command::Dream { themes, save, out }) => {
                assert_eq!(themes, vec!["Floating island", "Neon desert"]);
                assert!(save);
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_journal_delete() {
        let args = Args::try_parse_from(["dreamweaver", "journal", "delete", "2"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::Journal {
                command: JournalCommand::Delete { position: 2 }
            })
        ));
    }
}
