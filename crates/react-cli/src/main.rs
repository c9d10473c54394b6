use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use react_core::{AgentEvent, ToolExecutor};
use react_llm::{CacheSetting, CachingProvider, LLMProvider, OpenAIProvider};
use react_loop::{
    run_agent_loop_with_config, AgentLoopSettings, EpisodeOutcome, EpisodeState, ExactScorer,
    IncludesScorer, Scorer, Termination,
};
use react_tools::{BuiltinToolExecutor, LocalSandbox};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const PREVIEW_CHARS: usize = 400;

#[derive(Parser)]
#[command(name = "react-cli")]
#[command(about = "Run a tool-using ReAct agent against a local workspace")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single episode until it is scored or runs out of budget
    Run(RunArgs),
    /// Print the built-in tool schemas
    Tools,
}

#[derive(Args)]
struct RunArgs {
    /// Task prompt
    prompt: String,

    /// Directory the file tools can read from
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// Expected answer used to score submissions
    #[arg(long)]
    target: String,

    /// Require an exact match instead of a case-insensitive substring match
    #[arg(long)]
    exact: bool,

    #[arg(long, env = "REACT_MODEL", default_value = "gpt-4o")]
    model: String,

    #[arg(long, env = "REACT_BASE_URL", default_value = "https://api.openai.com/v1")]
    base_url: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// JSON settings file; flags below override its values
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    message_limit: Option<usize>,

    #[arg(long)]
    token_limit: Option<u64>,

    #[arg(long)]
    max_attempts: Option<usize>,

    /// Cache identical model requests for the duration of the run
    #[arg(long)]
    cache: bool,

    /// Cancel the episode after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,
}

impl RunArgs {
    fn load_settings(&self) -> anyhow::Result<AgentLoopSettings> {
        let mut settings = match &self.settings {
            Some(path) => AgentLoopSettings::from_file(path)?,
            None => AgentLoopSettings::default(),
        };

        if self.message_limit.is_some() {
            settings.message_limit = self.message_limit;
            settings.legacy.max_messages = None;
        }
        if self.token_limit.is_some() {
            settings.token_limit = self.token_limit;
        }
        if self.max_attempts.is_some() {
            settings.max_attempts = self.max_attempts;
        }
        if self.cache {
            settings.cache = CacheSetting::Enabled(true);
        }

        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Run(args) => run_episode(args).await,
        Commands::Tools => list_tools(),
    }
}

fn list_tools() -> anyhow::Result<()> {
    let executor = BuiltinToolExecutor::new(Arc::new(LocalSandbox::new(".")));
    for schema in executor.list_tools() {
        println!("{}", schema.function.name.cyan().bold());
        println!("  {}", schema.function.description);
        println!(
            "{}",
            serde_json::to_string_pretty(&schema.function.parameters)?.dimmed()
        );
    }
    Ok(())
}

async fn run_episode(args: RunArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.workspace.is_dir(),
        "workspace {:?} is not a directory",
        args.workspace
    );

    let config = args.load_settings()?.into_config()?;

    let provider = OpenAIProvider::new(args.api_key)
        .with_base_url(args.base_url)
        .with_model(args.model);
    let llm: Arc<dyn LLMProvider> = Arc::new(CachingProvider::new(Arc::new(provider)));
    let tools: Arc<dyn ToolExecutor> = Arc::new(BuiltinToolExecutor::new(Arc::new(
        LocalSandbox::new(args.workspace.clone()),
    )));
    let scorer: Arc<dyn Scorer> = if args.exact {
        Arc::new(ExactScorer::new(args.target))
    } else {
        Arc::new(IncludesScorer::new(args.target))
    };

    let cancel_token = CancellationToken::new();
    spawn_cancellation(cancel_token.clone(), args.time_limit.map(Duration::from_secs));

    let (event_tx, mut event_rx) = mpsc::channel(100);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    let mut state = EpisodeState::from_prompt(args.prompt);
    println!("{}", format!("🚀 Starting episode: {}", state.id()).cyan());

    let outcome = run_agent_loop_with_config(
        &mut state,
        event_tx,
        llm,
        tools,
        scorer,
        cancel_token,
        config,
    )
    .await;

    printer.await?;
    print_outcome(&outcome);

    Ok(())
}

/// Cancel on Ctrl-C or once the optional time limit passes.
fn spawn_cancellation(cancel_token: CancellationToken, time_limit: Option<Duration>) {
    let on_signal = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling episode");
            on_signal.cancel();
        }
    });

    if let Some(limit) = time_limit {
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            log::warn!("Time limit of {}s reached, cancelling episode", limit.as_secs());
            cancel_token.cancel();
        });
    }
}

fn print_event(event: &AgentEvent) {
    match event {
        AgentEvent::TurnStart {
            turn,
            message_count,
        } => {
            println!();
            println!(
                "{}",
                format!("── turn {} ({} messages) ──", turn, message_count).dimmed()
            );
        }
        AgentEvent::Generation { content, truncated } => {
            if *truncated {
                println!("{}", "⚠️  Generation truncated by context window".yellow());
            } else if !content.trim().is_empty() {
                println!("{}", preview(content, PREVIEW_CHARS));
            }
        }
        AgentEvent::ToolStart {
            tool_name,
            arguments,
            ..
        } => {
            println!("{}", format!("🔧 Executing tool: {}", tool_name).yellow());
            println!("{}", format!("   Args: {}", arguments).dimmed());
        }
        AgentEvent::ToolComplete { result, .. } => {
            let text = preview(&result.result, PREVIEW_CHARS);
            if result.success {
                println!("{}", format!("✅ Tool result: {}", text).green());
            } else {
                println!("{}", format!("❌ Tool error: {}", text).red());
            }
        }
        AgentEvent::ContextTrimmed {
            remaining_messages,
            ..
        } => {
            println!(
                "{}",
                format!(
                    "✂️  Dropped oldest message, {} remain",
                    remaining_messages
                )
                .yellow()
            );
        }
        AgentEvent::Scored {
            attempt,
            score,
            value,
        } => {
            println!(
                "{}",
                format!("📝 Attempt {} scored {} ({:.2})", attempt, score.value, value).cyan()
            );
        }
        AgentEvent::Complete { usage, .. } => {
            println!();
            println!(
                "{}",
                format!(
                    "📊 Tokens: prompt={}, completion={}, total={}",
                    usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                )
                .dimmed()
            );
        }
    }
}

fn print_outcome(outcome: &EpisodeOutcome) {
    println!("{}", "─".repeat(50).dimmed());

    let headline = format!("Termination: {}", outcome.termination);
    let headline = match &outcome.termination {
        Termination::Success => headline.green().bold(),
        Termination::MessageLimit | Termination::TokenLimit | Termination::Cancelled => {
            headline.yellow().bold()
        }
        Termination::AttemptsExhausted | Termination::Fatal(_) => headline.red().bold(),
    };
    println!("{}", headline);
    println!("Attempts: {}", outcome.attempts);
    if let Some(answer) = &outcome.answer {
        println!("Answer:   {}", preview(answer, PREVIEW_CHARS));
    }
    println!(
        "{}",
        format!(
            "Messages: {}, tokens: {}",
            outcome.message_count, outcome.tokens_used
        )
        .dimmed()
    );
}

fn preview(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
