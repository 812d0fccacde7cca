//! Interactive terminal for the toolgraph agent.
//!
//! ```sh
//! export DEEPSEEK_API_KEY=sk-...
//! toolgraph --english --max-cycles 3
//! ```

mod cli;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toolgraph_core::{AgentBuilder, PromptLanguage, DEFAULT_MAX_CYCLES};
use toolgraph_runtime::{parse_var, DeepSeekConfig, DeepSeekProvider};
use toolgraph_tools::default_registry;

use crate::cli::{is_exit, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(cli.log_filter()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = DeepSeekConfig::from_env();
    if let Some(model) = &cli.model {
        config.model.clone_from(model);
    }
    if config.api_key.is_empty() {
        eprintln!("warning: DEEPSEEK_API_KEY is not set; requests will be rejected");
    }

    let max_cycles = cli.max_cycles.unwrap_or_else(|| {
        parse_var(
            &|key: &str| std::env::var(key).ok(),
            "AGENT_MAX_CYCLES",
            DEFAULT_MAX_CYCLES,
        )
    });

    let agent = AgentBuilder::new()
        .provider(Arc::new(DeepSeekProvider::from_config(config.clone())?))
        .tools(default_registry())
        .language(cli.language())
        .generation(config.generation_options())
        .max_cycles(max_cycles)
        .build()?;

    let (you, bot) = match cli.language() {
        PromptLanguage::Chinese => ("你", "助手"),
        PromptLanguage::English => ("You", "Assistant"),
    };
    println!(
        "toolgraph {} | model {} | tools: {} | type 'exit' to quit",
        env!("CARGO_PKG_VERSION"),
        config.model,
        agent.tools().names().join(", ")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n{you}: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if is_exit(&line) {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match agent.invoke(query).await {
            Ok(answer) => println!("{bot}: {answer}"),
            Err(e) => {
                tracing::error!("Agent error: {}", e);
                println!("{bot}: {}", e.user_message());
            }
        }
    }

    Ok(())
}
