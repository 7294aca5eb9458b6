// command line interface

use crate::{
    Chat, FailurePolicy, LogNotifier, MemoryHistory, Notifier, OpenRouter, OpenRouterConfig,
    Output, RedFlags, Server, Session, WebhookNotifier,
};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sahayak", about = "Health questions with emergency red flag screening")]
struct Cli {
    /// openrouter api key
    #[arg(long, short = 'k', env = "OPENROUTER_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// model to ask
    #[arg(long, short, env = "SAHAYAK_MODEL", global = true)]
    model: Option<String>,

    /// chat completions base url
    #[arg(long, env = "SAHAYAK_API_URL", global = true)]
    api_url: Option<String>,

    /// give up on the model after this many seconds
    #[arg(long, default_value = "30", global = true)]
    timeout: u64,

    /// json file with keywords, urgency_terms and advisory_phrases
    #[arg(long, env = "SAHAYAK_RED_FLAGS", global = true)]
    red_flags: Option<PathBuf>,

    /// post emergency alerts here instead of only logging them
    #[arg(long, env = "SAHAYAK_WEBHOOK_URL", global = true)]
    webhook: Option<String>,

    /// give up on the alert gateway after this many seconds
    #[arg(long, default_value = "10", global = true)]
    alert_timeout: u64,

    /// still screen the message when the model can't be reached
    #[arg(long, global = true)]
    scan_on_failure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// start as http server
    Serve {
        /// port number
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// ask a single question
    Ask {
        message: String,

        /// session json: patient, tracks, check_ins
        #[arg(long)]
        profile: PathBuf,

        /// print json instead of text
        #[arg(long)]
        json: bool,
    },

    /// screen a message for red flags without calling the model
    Classify {
        message: String,

        /// model reply to screen as well
        #[arg(long, default_value = "")]
        reply: String,

        /// print json instead of text
        #[arg(long)]
        json: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let red_flags = match &cli.red_flags {
        Some(path) => RedFlags::load(path)?,
        None => RedFlags::default(),
    };

    match cli.command {
        Commands::Classify {
            ref message,
            ref reply,
            json,
        } => {
            let result = red_flags.classify(message, reply);
            if json {
                Output::raw(&result);
            } else {
                Output::classification(&result);
            }
            Ok(())
        }

        Commands::Serve { port, ref host } => {
            let chat = build_chat(&cli, red_flags)?;
            Ok(Server::run(chat, host, port).await?)
        }

        Commands::Ask {
            ref message,
            ref profile,
            json,
        } => {
            let session = Session::load(profile)?;
            let chat = build_chat(&cli, red_flags)?;

            let turn = chat
                .handle_turn(Some(&session), message)
                .await
                .into_diagnostic()?;

            if json {
                Output::raw(&turn);
            } else {
                Output::pretty(&turn);
            }
            Ok(())
        }
    }
}

fn build_chat(cli: &Cli, red_flags: RedFlags) -> Result<Chat> {
    let mut config = OpenRouterConfig::from_env(cli.api_key.clone())?;
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(url) = &cli.api_url {
        config.base_url = url.clone();
    }
    config.timeout = Duration::from_secs(cli.timeout);

    let completion = OpenRouter::new(config)?;
    tracing::debug!(model = completion.model(), "completion client ready");

    let notifier: Arc<dyn Notifier> = match &cli.webhook {
        Some(url) => Arc::new(WebhookNotifier::new(
            url.clone(),
            Duration::from_secs(cli.alert_timeout),
        )?),
        None => Arc::new(LogNotifier),
    };

    let policy = if cli.scan_on_failure {
        FailurePolicy::ScanMessage
    } else {
        FailurePolicy::AssumeSafe
    };

    Ok(Chat::new(Arc::new(completion), Arc::new(MemoryHistory::new()), notifier)
        .with_red_flags(red_flags)
        .with_failure_policy(policy))
}
