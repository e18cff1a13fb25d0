use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;
use tasksync_lib::config::EngineConfig;
use tasksync_lib::{extract_tasks_deterministic, init_tracing, ExtractOptions, ModelOrchestrator};

#[derive(Parser)]
#[command(name = "tasksync")]
#[command(about = "Extract structured tasks from English or Romanian notes", long_about = None)]
struct Cli {
    /// Use only the rule engine, never contact a model
    #[arg(long, conflicts_with_all = ["load", "wait_model", "status"])]
    deterministic: bool,

    /// Start loading the model before extracting
    #[arg(long)]
    load: bool,

    /// Wait for the model load to finish before extracting (implies --load)
    #[arg(long)]
    wait_model: bool,

    /// Print the model status as JSON and exit
    #[arg(long)]
    status: bool,

    /// Language hint for the model ("ro", "en")
    #[arg(long)]
    lang: Option<String>,

    /// Note text. Read from stdin when omitted.
    #[arg(trailing_var_arg = true)]
    text: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.deterministic {
        let tasks = extract_tasks_deterministic(&read_note(&cli.text)?);
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    let config = EngineConfig::from_env();
    let orchestrator = ModelOrchestrator::from_config(&config);

    if cli.load || cli.wait_model {
        orchestrator.start_loading();
    }
    if cli.wait_model {
        orchestrator.wait_for_load();
    }

    if cli.status {
        println!("{}", serde_json::to_string_pretty(&orchestrator.get_status())?);
        return Ok(());
    }

    let options = ExtractOptions {
        language_hint: cli.lang,
        ..ExtractOptions::default()
    };
    let result = orchestrator.process_text(&read_note(&cli.text)?, &options);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn read_note(args: &[String]) -> Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read note from stdin")?;
    Ok(buf)
}
