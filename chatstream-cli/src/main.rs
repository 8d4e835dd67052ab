//! chatstream CLI - stream chat completions to the terminal.
//!
//! One-shot mode streams a single prompt; without a prompt an interactive
//! loop reads prompts from stdin. Ctrl-C cancels the in-flight exchange.

#![allow(clippy::print_stdout, clippy::print_stderr)] // CLI program intentionally uses stdout

use chatstream::prelude::*;
use clap::Parser;
// The prelude re-exports `chatstream::Result` (one type parameter); re-import
// the std alias so the CLI's `Result<(), CliError>` signatures resolve.
use std::result::Result;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncBufReadExt;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

/// Exit code for an exchange cancelled by Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

/// Stream chat completions to the terminal.
#[derive(Parser)]
#[command(name = "chatstream")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Prompt to send; reads prompts interactively when omitted
    prompt: Option<String>,

    /// Image attachment path (repeatable, order preserved)
    #[arg(short, long = "image", value_name = "PATH")]
    image: Vec<PathBuf>,

    /// Use the offline simulated responder instead of the network
    #[arg(long)]
    offline: bool,

    /// Use one model for every request, overriding the policy
    #[arg(short, long, env = "CHATSTREAM_MODEL")]
    model: Option<String>,

    /// System instruction
    #[arg(long, value_name = "TEXT")]
    system: Option<String>,

    /// Response length cap in tokens
    #[arg(long, value_name = "N")]
    max_tokens: Option<u32>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Errors surfaced by the CLI.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Chat call failed.
    #[error(transparent)]
    Chat(#[from] chatstream::Error),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Chat(chatstream::Error::Cancelled))
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_cancelled() => {
            eprintln!("cancelled");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let provider: Box<dyn ChatProvider> = if cli.offline {
        Box::new(MockResponder::new(vec![
            "This is a simulated reply from the offline responder.".to_string(),
        ]))
    } else {
        Box::new(ChatClient::from_env()?)
    };

    let mut options = ChatOptions::default();
    if let Some(system) = cli.system {
        options = options.with_system_prompt(system);
    }
    if let Some(max_tokens) = cli.max_tokens {
        options = options.with_max_tokens(max_tokens);
    }
    if let Some(model) = cli.model {
        options = options.with_model(ModelPolicy::single(model));
    }

    match cli.prompt {
        Some(prompt) => {
            let request = build_request(prompt, &cli.image);
            stream_exchange(provider.as_ref(), &request, &options).await
        }
        None => interactive(provider.as_ref(), &options, &cli.image).await,
    }
}

fn build_request(prompt: String, images: &[PathBuf]) -> ChatRequest {
    images
        .iter()
        .fold(ChatRequest::new(prompt), |request, path| {
            request.attach(Attachment::from_path(path))
        })
}

/// Stream one exchange to stdout; Ctrl-C cancels it.
async fn stream_exchange(
    provider: &dyn ChatProvider,
    request: &ChatRequest,
    options: &ChatOptions,
) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let result = provider
        .stream_to(request, options, cancel, |fragment| {
            print!("{fragment}");
            let _ = std::io::stdout().flush();
        })
        .await;
    watcher.abort();

    let outcome = result?;
    println!();
    debug!(
        fragments = outcome.fragments,
        saw_done = outcome.saw_done,
        "stream finished"
    );
    Ok(())
}

/// Read prompts from stdin until EOF. Attachments given on the command
/// line ride along with every prompt. A cancelled exchange does not end
/// the session.
async fn interactive(
    provider: &dyn ChatProvider,
    options: &ChatOptions,
    images: &[PathBuf],
) -> Result<(), CliError> {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }

        let request = build_request(prompt.to_string(), images);
        match stream_exchange(provider, &request, options).await {
            Ok(()) => {}
            Err(err) if err.is_cancelled() => eprintln!("cancelled"),
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
