use clap::{CommandFactory, Parser, Subcommand};
use openrouter_kit::config::{config_search_paths, Settings};
use openrouter_kit::planner::{DomainInfo, InstanceInfo, PlanTranslator};
use openrouter_kit::translate::responses_types::ResponsesRequest;
use openrouter_kit::{
    extract_text, to_plain_mapping, ClientConfig, Message, OpenRouterClient, SharedLedger,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "openrouter-kit",
    about = "Send prompts and plan translations through OpenRouter",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Usage ledger path (overrides config)
    #[arg(long, global = true)]
    usage_log: Option<PathBuf>,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Send a prompt through the Responses API and print the answer
    Ask {
        prompt: String,

        /// System instructions
        #[arg(short, long)]
        system: Vec<String>,

        /// Model id or alias from the config
        #[arg(short, long)]
        model: Option<String>,

        /// Print the full response as JSON instead of its text
        #[arg(long)]
        json: bool,
    },

    /// Translate a natural-language plan into PDDL actions
    Plan {
        /// File with the plan text ("-" for stdin)
        input: PathBuf,

        #[arg(long)]
        domain: String,

        #[arg(long, default_value_t = 0)]
        instance: u64,

        #[arg(short, long)]
        model: Option<String>,

        /// Also print the raw model output
        #[arg(long)]
        raw: bool,
    },

    /// Show token totals from the usage ledger
    Usage {
        /// Number of recent records to list
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openrouter_kit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings = Settings::find_and_load(cli.config.as_deref())?;
    let ledger = cli
        .usage_log
        .as_ref()
        .or(settings.usage_log.as_ref())
        .map(SharedLedger::open)
        .transpose()?;

    match command {
        Command::Ask {
            prompt,
            system,
            model,
            json,
        } => {
            let client = build_client(&settings)?;
            let model = settings.pick_model(model.as_deref());

            let mut messages: Vec<Message> = system.into_iter().map(Message::system).collect();
            messages.push(Message::user(prompt));

            let resp = client
                .create_response(&ResponsesRequest::from_messages(&model, &messages))
                .await?;

            if let Some(ref ledger) = ledger {
                ledger.record_response(&resp);
            }

            if json {
                let plain = serde_json::Value::Object(to_plain_mapping(&resp));
                println!("{}", serde_json::to_string_pretty(&plain)?);
            } else {
                println!("{}", extract_text(&resp));
            }
        }
        Command::Plan {
            input,
            domain,
            instance,
            model,
            raw,
        } => {
            let text = if input.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin())?
            } else {
                std::fs::read_to_string(&input)?
            };

            let client = build_client(&settings)?;
            let mut translator =
                PlanTranslator::new(&client).with_model(settings.pick_model(model.as_deref()));
            if let Some(ref ledger) = ledger {
                translator = translator.with_ledger(ledger.clone());
            }

            let domain = DomainInfo {
                domain_name: domain,
                description: None,
            };
            let (plan, raw_translation) = translator
                .text_to_plan(&text, &domain, &InstanceInfo { instance_id: instance })
                .await?;

            if raw {
                println!("{raw_translation}");
                println!("---");
            }
            println!("{plan}");
        }
        Command::Usage { limit } => {
            let Some(ledger) = ledger else {
                anyhow::bail!("No usage ledger configured. Pass --usage-log or set usage_log in the config file.");
            };
            for record in ledger.recent(limit) {
                println!(
                    "{}  {:<40} in={:<7} out={:<7} total={}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.model,
                    record.prompt_tokens,
                    record.completion_tokens,
                    record.total_tokens
                );
            }
            let totals = ledger.totals();
            println!(
                "Totals: requests={} in={} out={} total={}",
                totals.requests, totals.prompt_tokens, totals.completion_tokens, totals.total_tokens
            );
        }
    }

    Ok(())
}

fn build_client(settings: &Settings) -> anyhow::Result<OpenRouterClient> {
    let config = ClientConfig::from_env()?;
    info!(base_url = %config.base_url, "Using routing service");
    Ok(OpenRouterClient::with_timeout(
        config,
        Duration::from_secs(settings.timeout_secs),
    )?)
}
