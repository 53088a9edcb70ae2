use anyhow::Context;
use aqua_desk::config::Command;
use aqua_desk::core::prompt::build_prompt;
use aqua_desk::utils::error::ErrorSeverity;
use aqua_desk::utils::{logger, validation::Validate};
use aqua_desk::{connect, AccountStore, AquaError, CliConfig, QueryEngine, QueryType};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Command::List = cli.command {
        for query_type in QueryType::ALL {
            let scope = if query_type.requires_account() {
                "account"
            } else {
                "informational"
            };
            println!("{:<24} {}", query_type.as_str(), scope);
        }
        return Ok(());
    }

    let store = match connect(&config) {
        Ok(store) => store,
        Err(e) => exit_with(e),
    };
    let engine: QueryEngine<dyn AccountStore> = QueryEngine::new(store);

    if let Err(e) = execute(&engine, cli.command).await {
        match e.downcast::<AquaError>() {
            Ok(e) => exit_with(e),
            Err(other) => return Err(other),
        }
    }

    Ok(())
}

async fn execute(engine: &QueryEngine<dyn AccountStore>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Query {
            query_type,
            identifier,
        } => {
            let report = engine.run(&query_type, &identifier).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Resolve { identifier } => {
            let triple = engine.resolve_strict(&identifier).await?;
            println!("✅ Client:   {} ({})", triple.client.full_name(), triple.client.id);
            println!(
                "   Contract: {} [{}]",
                triple.contract.id,
                triple.contract.service_state.as_str()
            );
            println!("   Meter:    {} (id {})", triple.meter.number, triple.meter.id);
        }
        Command::Account { identifier } => {
            let graph = engine.account(&identifier).await?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        Command::Prompt {
            question,
            identifier,
        } => {
            let graph = engine.account(&identifier).await?;
            let prompt = build_prompt(&question, &graph).context("building prompt")?;
            println!("{}", prompt);
        }
        Command::Health => {
            engine.health_check().await?;
            println!("✅ Account store is reachable");
        }
        Command::List => {}
    }
    Ok(())
}

fn exit_with(e: AquaError) -> ! {
    let fault = e.fault();
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!(
        "{}",
        serde_json::to_string_pretty(&fault).unwrap_or_else(|_| fault.message.clone())
    );
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
