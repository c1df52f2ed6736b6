//! CLI definitions for AutoWeb.

use std::path::PathBuf;

use autoweb_engine::{Action, AutomationRequest};
use autoweb_protocols::CaptureMode;
use clap::{Parser, Subcommand};

/// AutoWeb CLI.
#[derive(Parser)]
#[command(name = "autoweb")]
#[command(about = "LLM-directed browser automation")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Server host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Plan and run one task, printing the JSON response
    Run {
        /// Entry page
        #[arg(long)]
        url: String,

        /// Natural-language task
        #[arg(long)]
        task: String,

        /// `provider:model` or a model of the default provider
        #[arg(long)]
        model: Option<String>,

        /// Show the model the accessibility tree instead of HTML
        #[arg(long)]
        aria: bool,

        /// Fail on the first step error instead of asking for a fix
        #[arg(long)]
        no_repair: bool,
    },

    /// Open a page in the shared browser
    Open {
        #[arg(long)]
        url: String,
    },
}

/// Request for the one-shot `run` command.
pub(crate) fn run_request(
    url: String,
    task: String,
    model: Option<String>,
    aria: bool,
    no_repair: bool,
) -> AutomationRequest {
    let mut request = AutomationRequest::new(Action::PrepareAndRun)
        .with_entry_url(url)
        .with_task(task);
    request.model = model;
    request.capture_mode = if aria {
        CaptureMode::AriaSnapshot
    } else {
        CaptureMode::RawHtml
    };
    request.auto_repair = !no_repair;
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["autoweb"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["autoweb", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert!(host.is_none());
                assert_eq!(port, Some(9000));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_run_requires_url_and_task() {
        assert!(Cli::try_parse_from(["autoweb", "run", "--url", "https://example.com"]).is_err());
        let cli = Cli::try_parse_from([
            "autoweb",
            "--config",
            "my.toml",
            "run",
            "--url",
            "https://example.com",
            "--task",
            "count rows",
            "--aria",
            "--no-repair",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("my.toml"));
        match cli.command {
            Some(Commands::Run { url, task, aria, no_repair, model }) => {
                assert_eq!(url, "https://example.com");
                assert_eq!(task, "count rows");
                assert!(aria);
                assert!(no_repair);
                assert!(model.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_request() {
        let request = run_request(
            "https://example.com".into(),
            "count rows".into(),
            Some("anthropic:claude".into()),
            true,
            true,
        );
        assert_eq!(request.action, Action::PrepareAndRun);
        assert_eq!(request.entry_url.as_deref(), Some("https://example.com"));
        assert_eq!(request.user_task.as_deref(), Some("count rows"));
        assert_eq!(request.model.as_deref(), Some("anthropic:claude"));
        assert_eq!(request.capture_mode, CaptureMode::AriaSnapshot);
        assert!(!request.auto_repair);

        let request = run_request("u".into(), "t".into(), None, false, false);
        assert_eq!(request.capture_mode, CaptureMode::RawHtml);
        assert!(request.auto_repair);
    }
}
