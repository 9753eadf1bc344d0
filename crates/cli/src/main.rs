use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use safenest_agents::CompanionAgent;
use safenest_core::{restrictions_for_age, AgeTier, ChatInput};
use safenest_observability::{init_tracing, AppMetrics};
use safenest_storage::MemoryStore;

#[derive(Debug, Parser)]
#[command(name = "safenest")]
#[command(about = "SafeNest companion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive companion chat session.
    Chat {
        #[arg(long, default_value = "friend")]
        name: String,
        #[arg(long, default_value_t = 12)]
        age: u8,
        #[arg(long, default_value_t = 1500)]
        typing_delay_ms: u64,
    },
    /// Print the age-based content restrictions for an age.
    Restrictions {
        #[arg(long)]
        age: u8,
    },
    /// Print the age tier and protection level for an age.
    Tier {
        #[arg(long)]
        age: u8,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("safenest_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Chat {
            name,
            age,
            typing_delay_ms,
        } => run_chat(name, age, Duration::from_millis(typing_delay_ms)).await?,
        Command::Restrictions { age } => {
            println!("{}", serde_json::to_string_pretty(&restrictions_for_age(age))?);
        }
        Command::Tier { age } => {
            let tier = AgeTier::for_age(age);
            println!("{} ({})", tier.group_label(), tier.protection_label());
        }
    }

    Ok(())
}

async fn run_chat(name: String, age: u8, typing_delay: Duration) -> Result<()> {
    let agent = CompanionAgent::with_typing_delay(
        Arc::new(MemoryStore::new()),
        AppMetrics::shared(),
        typing_delay,
    );
    let handle = agent.open_session(name, age).await?;

    println!("SafeNest chat mode. type 'exit' to quit.");
    println!("\n{}\n", handle.greeting.text);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let exchange = agent
            .handle_message(ChatInput {
                session_id: handle.session_id.clone(),
                text: message.to_string(),
            })
            .await?;

        let sentiment = exchange
            .user_message
            .sentiment
            .map(|label| label.as_code())
            .unwrap_or("neutral");

        if let Some(reply) = exchange.reply {
            println!("\n[{sentiment}] {}\n", reply.text);
        }
    }

    agent.logout(&handle.session_id).await?;
    Ok(())
}
