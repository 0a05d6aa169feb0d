use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::catalog::AuxiliaryKind;
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuxArg {
    Poses,
    Calib,
    Times,
}

impl From<AuxArg> for AuxiliaryKind {
    fn from(a: AuxArg) -> Self {
        match a {
            AuxArg::Poses => AuxiliaryKind::Poses,
            AuxArg::Calib => AuxiliaryKind::Calibration,
            AuxArg::Times => AuxiliaryKind::Times,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "drivechat")]
#[command(version)]
#[command(about = "Chat with precomputed driving-sequence statistics through a hosted LLM")]
pub struct Args {
    /// Question to ask about the selected sequence
    pub question: Option<String>,

    /// Sequence id from the gallery (e.g. 07)
    #[arg(long, short)]
    pub sequence: Option<String>,

    /// Print the sequence gallery and exit
    #[arg(long)]
    pub list: bool,

    /// Print the video URL and title of the selected sequence
    #[arg(long)]
    pub video: bool,

    /// Print one of the sequence's plain-text side files
    #[arg(long, value_enum)]
    pub aux: Option<AuxArg>,

    /// Read questions from stdin, one per line, until EOF
    #[arg(long, short)]
    pub interactive: bool,

    /// Model id on the completion endpoint
    #[arg(long)]
    pub model: Option<String>,

    /// Override the chat-completion endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the asset host base URL
    #[arg(long)]
    pub asset_base: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(long, short)]
    pub verbose: bool,
}

impl Args {
    /// Apply flags on top of file and environment configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.completions_url = endpoint.clone();
        }
        if let Some(base) = &self.asset_base {
            config.asset_base_url = base.clone();
        }
    }

    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "drivechat=debug"
        } else {
            "drivechat=info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_minimal() {
        let args = Args::parse_from(["drivechat"]);
        assert!(args.question.is_none());
        assert!(args.sequence.is_none());
        assert!(!args.list);
        assert!(!args.video);
        assert!(!args.interactive);
        assert!(!args.verbose);
        assert!(args.aux.is_none());
    }

    #[test]
    fn test_args_parse_question_and_sequence() {
        let args = Args::parse_from(["drivechat", "How busy is the road?", "--sequence", "07"]);
        assert_eq!(args.question.as_deref(), Some("How busy is the road?"));
        assert_eq!(args.sequence.as_deref(), Some("07"));
    }

    #[test]
    fn test_args_short_flags() {
        let args = Args::parse_from(["drivechat", "-s", "3", "-i", "-v"]);
        assert_eq!(args.sequence.as_deref(), Some("3"));
        assert!(args.interactive);
        assert!(args.verbose);
        assert_eq!(args.default_log_filter(), "drivechat=debug");
    }

    #[test]
    fn test_args_aux_values() {
        let args = Args::parse_from(["drivechat", "-s", "01", "--aux", "calib"]);
        assert_eq!(args.aux, Some(AuxArg::Calib));
        assert_eq!(AuxiliaryKind::from(AuxArg::Calib), AuxiliaryKind::Calibration);
        assert!(Args::try_parse_from(["drivechat", "--aux", "lidar"]).is_err());
    }

    #[test]
    fn test_overrides_beat_config() {
        let args = Args::parse_from([
            "drivechat",
            "--model",
            "openai/gpt-4o-mini",
            "--endpoint",
            "http://127.0.0.1:8080/v1/chat/completions",
            "--asset-base",
            "http://127.0.0.1:8081",
        ]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert_eq!(config.completions_url, "http://127.0.0.1:8080/v1/chat/completions");
        assert_eq!(config.asset_base_url, "http://127.0.0.1:8081");
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = Args::parse_from(["drivechat", "--list"]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config, Config::default());
        assert_eq!(args.default_log_filter(), "drivechat=info");
    }
}
