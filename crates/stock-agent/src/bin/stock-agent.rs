//! Stock analysis agent CLI
//!
//! # Usage
//!
//! ```bash
//! # Copy env_example.txt to .env and fill in OPENAI_API_KEY
//! cargo run --bin stock-agent                # interactive mode
//! cargo run --bin stock-agent -- examples    # demo queries
//! cargo run --bin stock-agent -- check-env   # validate the environment
//! ```

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use stock_agent::StockAgentSystem;
use stock_agent::agents::AgentResponse;
use stock_agent_utils::{EnvTemplate, Settings, init_tracing, render_template};
use tracing::info;

const RULE: &str = "==================================================";
const PREVIEW_CHARS: usize = 200;
const HISTORY_SHOWN: usize = 10;

const REPL_TEST_QUERIES: [&str; 3] = [
    "Get the current stock price for AAPL",
    "Get detailed information about MSFT",
    "Analyze TSLA comprehensively",
];

#[derive(Parser, Debug)]
#[command(name = "stock-agent")]
#[command(about = "AI stock analysis agent system", long_about = None)]
struct Args {
    /// Env file to load instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive query loop (default)
    Interactive,
    /// Run the demo queries
    Examples,
    /// Run the system self-test and print the result as JSON
    Test,
    /// Validate the environment and the bundled template
    CheckEnv,
    /// Print an env template generated from the contract
    EnvTemplate,
}

fn load_settings(env_file: Option<&PathBuf>) -> anyhow::Result<Settings> {
    let settings = match env_file {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Settings::load()?,
    };
    Ok(settings)
}

fn build_system(settings: Settings) -> anyhow::Result<StockAgentSystem> {
    println!("🚀 Initializing AI Stock Analysis Agent System...");
    println!("{RULE}");
    let system = StockAgentSystem::new(settings)?;
    println!("✅ System initialized successfully!");
    Ok(system)
}

/// First `max` characters, with an ellipsis when cut
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn print_outcome(response: &AgentResponse) {
    if response.success {
        println!("✅ SUCCESS");
        println!("{}", response.output);
    } else {
        println!(
            "❌ FAILED: {}",
            response.error.as_deref().unwrap_or("Unknown error")
        );
    }
}

async fn show_system_info(system: &StockAgentSystem) {
    let status = system.system_status().await;
    let capabilities = system.agent_capabilities();

    println!("\n📊 SYSTEM INFORMATION:");
    println!("Status: ✅ Initialized");
    println!("Model: {}", status.model);
    println!("Market Data: {}", status.market_data);
    println!("Tools Available: {}", status.tools);
    println!("Session History: {} queries", status.session_history_length);

    println!("\n🤖 AGENT CAPABILITIES:");
    for (agent, caps) in [
        ("ORCHESTRATOR", capabilities.orchestrator),
        ("JUNIOR", capabilities.junior),
        ("MASTER", capabilities.master),
    ] {
        println!("\n{agent} AGENT:");
        for cap in caps {
            println!("  • {cap}");
        }
    }

    println!("\n🛠️ AVAILABLE TOOLS:");
    for tool in system.available_tools() {
        println!("  • {}: {}", tool.name, tool.description);
    }
}

fn show_help() {
    println!(
        r#"
📚 AVAILABLE COMMANDS:

Query Commands:
  • Any stock-related question (e.g., "Get price for AAPL")
  • "Analyze TSLA comprehensively"
  • "Compare AAPL, MSFT, GOOGL"
  • "Portfolio analysis: AAPL, MSFT, GOOGL, TSLA"

System Commands:
  • help     - Show this help message
  • status   - Show system information
  • test     - Test the system
  • history  - Show query history
  • clear    - Clear session history
  • quit     - Exit the application
"#
    );
}

async fn run_repl_tests(system: &StockAgentSystem) {
    println!("\n🧪 TESTING SYSTEM...");
    for (i, query) in REPL_TEST_QUERIES.iter().enumerate() {
        println!("\n📝 Test {}: {query}", i + 1);
        println!("{}", "-".repeat(40));

        let response = system.analyze_query(query).await;
        if response.success {
            println!("✅ SUCCESS");
            println!("{}", preview(&response.output, PREVIEW_CHARS));
        } else {
            println!(
                "❌ FAILED: {}",
                response.error.as_deref().unwrap_or("Unknown error")
            );
        }
    }
    println!("\n✅ System testing completed!");
}

async fn show_history(system: &StockAgentSystem) {
    let history = system.session_history().await;
    if history.is_empty() {
        println!("📝 No queries in history");
        return;
    }

    println!("\n📝 QUERY HISTORY ({} queries):", history.len());
    println!("{}", "-".repeat(50));
    let start = history.len().saturating_sub(HISTORY_SHOWN);
    for (i, entry) in history[start..].iter().enumerate() {
        println!("{}. Query: {}", i + 1, entry.query);
        println!("   Success: {}", if entry.result.success { "✅" } else { "❌" });
        println!("   Agent: {}", entry.result.agent);
        println!();
    }
}

async fn run_interactive(system: &StockAgentSystem) -> anyhow::Result<()> {
    show_system_info(system).await;

    println!("\n{RULE}");
    println!("🎯 INTERACTIVE MODE");
    println!("Type 'help' for commands, 'quit' to exit");
    println!("{RULE}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\n🤖 Enter your query: ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let query = input.trim();
        if query.is_empty() {
            continue;
        }

        match query.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("👋 Goodbye!");
                break;
            }
            "help" => show_help(),
            "status" => show_system_info(system).await,
            "test" => run_repl_tests(system).await,
            "history" => show_history(system).await,
            "clear" => {
                system.clear_session_history().await;
                println!("✅ Session history cleared");
            }
            _ => {
                println!("\n🔄 Processing query...");
                let response = system.analyze_query(query).await;
                if response.success {
                    println!("\n📋 RESULT:");
                    println!("{}", "-".repeat(30));
                    println!("{}", response.output);
                } else {
                    println!(
                        "\n❌ Error: {}",
                        response.error.as_deref().unwrap_or("Unknown error")
                    );
                }
            }
        }
    }

    Ok(())
}

async fn run_examples(system: &StockAgentSystem) {
    println!("🎯 RUNNING EXAMPLES...");
    println!("{RULE}");

    let compare = ["AAPL".to_string(), "MSFT".to_string(), "GOOGL".to_string()];
    let (price, info, analysis, comparison) = futures::future::join4(
        system.get_stock_price("AAPL"),
        system.get_stock_info("MSFT"),
        system.analyze_stock("TSLA"),
        system.compare_stocks(&compare),
    )
    .await;
    let results = [price, info, analysis, comparison];

    let titles = [
        "Get Stock Price",
        "Get Stock Information",
        "Comprehensive Analysis",
        "Compare Stocks",
    ];
    for (i, (title, response)) in titles.iter().zip(&results).enumerate() {
        println!("\n📊 Example {}: {title}", i + 1);
        println!("{}", "-".repeat(30));
        print_outcome(response);
    }

    println!("\n✅ Examples completed!");
}

/// Returns false when anything needs fixing
fn check_env(settings: &Settings) -> bool {
    let mut ok = true;

    println!("🔍 Environment:");
    for (key, value) in settings.redacted_summary() {
        println!("  {key}={value}");
    }

    match settings.validate() {
        Ok(()) => println!("✅ Settings valid (market data: {})", settings.market_data_provider()),
        Err(e) => {
            println!("❌ {e}");
            ok = false;
        }
    }

    match EnvTemplate::embedded() {
        Ok(template) => {
            let issues = template.check_documentation();
            if issues.is_empty() {
                println!(
                    "✅ Template documents all {} keys",
                    template.entries().len()
                );
            } else {
                ok = false;
                for issue in issues {
                    println!("❌ Template: {issue}");
                }
            }
        }
        Err(e) => {
            println!("❌ Template does not parse: {e}");
            ok = false;
        }
    }

    ok
}

fn prepare(env_file: Option<&PathBuf>) -> anyhow::Result<Settings> {
    let settings = load_settings(env_file)?;
    init_tracing(settings.verbose);
    info!(model = %settings.openai_model, "Starting stock-agent");
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let env_file = args.env_file.as_ref();

    match args.command.unwrap_or(Command::Interactive) {
        Command::EnvTemplate => print!("{}", render_template()),
        Command::CheckEnv => {
            if !check_env(&prepare(env_file)?) {
                std::process::exit(1);
            }
        }
        Command::Test => {
            let system = StockAgentSystem::new(prepare(env_file)?)?;
            let report = system.test_system().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Examples => {
            println!("🤖 AI Stock Analysis Agent System");
            println!("{RULE}");
            let system = build_system(prepare(env_file)?)?;
            run_examples(&system).await;
        }
        Command::Interactive => {
            println!("🤖 AI Stock Analysis Agent System");
            println!("{RULE}");
            let system = build_system(prepare(env_file)?)?;
            run_interactive(&system).await?;
        }
    }

    Ok(())
}
