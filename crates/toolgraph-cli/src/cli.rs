use clap::Parser;
use toolgraph_core::PromptLanguage;

/// Chat with the tool-using agent from the terminal.
///
/// Reads DeepSeek settings from the environment (or a `.env` file).
#[derive(Debug, Parser)]
#[command(name = "toolgraph", version)]
pub struct Cli {
    /// Log graph transitions and HTTP traffic at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Use the English prompt template instead of the Chinese one
    #[arg(long)]
    pub english: bool,

    /// Tool runs allowed per query (overrides AGENT_MAX_CYCLES)
    #[arg(long)]
    pub max_cycles: Option<usize>,

    /// Model name (overrides DEEPSEEK_MODEL)
    #[arg(long)]
    pub model: Option<String>,
}

impl Cli {
    pub fn language(&self) -> PromptLanguage {
        if self.english {
            PromptLanguage::English
        } else {
            PromptLanguage::Chinese
        }
    }

    pub fn log_filter(&self) -> String {
        if self.verbose {
            "debug".into()
        } else {
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into())
        }
    }
}

/// `exit` or `quit`, in any case
pub fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["toolgraph", "--english", "--max-cycles", "3", "-v"]).unwrap();
        assert_eq!(cli.language(), PromptLanguage::English);
        assert_eq!(cli.max_cycles, Some(3));
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["toolgraph"]).unwrap();
        assert_eq!(cli.language(), PromptLanguage::Chinese);
        assert!(cli.max_cycles.is_none());
        assert!(cli.model.is_none());
    }

    #[test]
    fn test_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("  QUIT \n"));
        assert!(!is_exit("exit now"));
    }
}
