use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tickwise::agents::{resolve_provider, Credentials, ToolKind, ToolRegistry};
use tickwise::report::{credential_status, render_json, render_status, render_text, StatusReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tickwise", about = "LLM-orchestrated stock analysis")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/tickwise.toml", global = true)]
    config: String,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Pretty-print the output JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a full analysis of one ticker
    Analyze {
        ticker: String,
        /// Optional focus, e.g. "earnings momentum"
        query: Option<String>,
    },
    /// Invoke a single signal tool without the language model
    Tool { name: String, query: String },
    /// Show provider selection, tools and credential presence
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = tickwise::load_config(&cli.config)?;
    let credentials = Credentials::from_env(&config.credentials);

    match cli.command {
        Command::Analyze { ticker, query } => {
            let analyzer = tickwise::build_analyzer(&config, &credentials)
                .context("Failed to build analyzer")?;
            let report = tickwise::analyze(&analyzer, &ticker, query.as_deref())
                .await
                .map_err(|e| anyhow::anyhow!("Analysis failed: {e}"))?;

            let output = if cli.json {
                render_json(&report, cli.pretty)?
            } else {
                render_text(&report)
            };
            println!("{output}");
        }
        Command::Tool { name, query } => {
            let context = tickwise::build_tool_context(&config)?;
            let registry = ToolRegistry::standard(context);
            let tool = registry.get(&name).with_context(|| {
                format!("Unknown tool '{name}', expected one of: {}", registry.names().join(", "))
            })?;
            println!("{}", tool.invoke(&query).await);
        }
        Command::Status => {
            let selection = resolve_provider(&config.llm, &credentials);
            if let Err(e) = &selection {
                tracing::warn!(error = %e, "No provider available");
            }
            let selection = selection.ok();
            let status = StatusReport {
                provider: selection.as_ref().map(|s| s.kind.to_string()),
                model: selection.as_ref().map(|s| s.model.clone()),
                tools: ToolKind::ALL
                    .iter()
                    .map(|kind| kind.name().to_string())
                    .collect(),
                credentials: credential_status(&config.credentials, &credentials),
            };
            let output = if cli.json {
                render_json(&status, cli.pretty)?
            } else {
                render_status(&status)
            };
            println!("{output}");
        }
    }

    Ok(())
}
