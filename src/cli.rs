use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Multi-agent fact-checker: claim extraction, evidence checking and math validation
#[derive(Parser, Debug, Clone)]
#[command(name = "factcheck", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "FACTCHECK_CONFIG", default_value = "factcheck.toml")]
    pub config: PathBuf,

    /// Model identifier (overrides [llm].model)
    #[arg(long, env = "FACTCHECK_MODEL")]
    pub model: Option<String>,

    /// Disable the external search tool provider
    #[arg(long)]
    pub no_search: bool,

    /// Caption/transcript file to analyze (e.g. a .vtt file)
    #[arg(short, long)]
    pub transcript: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fact-check one piece of text and exit
    Check {
        /// Text to fact-check
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Interactive conversation (default)
    Chat,
}

impl Cli {
    /// The command to run, defaulting to an interactive chat
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["factcheck"]);
        assert_eq!(cli.config, PathBuf::from("factcheck.toml"));
        assert!(cli.model.is_none());
        assert!(!cli.no_search);
        assert!(cli.transcript.is_none());
        assert_eq!(cli.command(), Command::Chat);
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "factcheck",
            "--config",
            "custom.toml",
            "--model",
            "claude-3-5-sonnet-20241022",
            "--no-search",
            "--transcript",
            "talk.vtt",
            "check",
            "12%",
            "of",
            "250",
            "is",
            "40",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.model.as_deref(), Some("claude-3-5-sonnet-20241022"));
        assert!(cli.no_search);
        assert_eq!(cli.transcript, Some(PathBuf::from("talk.vtt")));
        match cli.command() {
            Command::Check { text } => assert_eq!(text.join(" "), "12% of 250 is 40"),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
