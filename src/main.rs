mod answer;
mod config;
mod corpus;
mod engine;
mod index;
mod retriever;
mod transactions;
mod vector_ops;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::State;
use crate::engine::RagEngine;
use crate::transactions::{load_transactions, monthly_spending};

/// The interactive loop always retrieves three sentences per question.
const CHAT_TOP_K: usize = 3;

#[derive(Parser)]
#[command(name = "ragtail")]
#[command(version = "0.1")]
#[command(about = "Retrieval-backed Q&A over retail transactions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Chat,
    Ask { question: String },
    Corpus,
    Report,
    Config,
}

fn build_engine(state: &State) -> Result<RagEngine> {
    let records = load_transactions(Path::new(&state.path))?;
    config::verbose_print(&format!(
        "Loaded {} transactions from '{}'",
        records.len(),
        state.path
    ));
    RagEngine::new(records, state.customers.clone())
}

fn chat_command(state: &State) -> Result<()> {
    let mut engine = build_engine(state)?;
    println!("ragtail chat started. Type 'exit' to stop.");

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("\nYou: ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let question = input.trim();
        if question.eq_ignore_ascii_case("exit") {
            break;
        }
        if question.eq_ignore_ascii_case("memory") {
            match &engine.memory.previous_question {
                Some(previous) => println!("Previous question: {}", previous),
                None => println!("No previous question stored yet."),
            }
            continue;
        }

        let (hits, answer) = engine.answer(question, CHAT_TOP_K);
        for hit in &hits {
            config::verbose_print(&format!("[{:.3}] {}", hit.score, hit.sentence));
        }
        println!("Bot: {}", answer);
    }
    Ok(())
}

fn ask_command(state: &State, question: &str) -> Result<()> {
    let mut engine = build_engine(state)?;
    let (hits, answer) = engine.answer(question, state.top_k);

    let actual_results_count = hits.len();
    let output = serde_json::json!({
        "question": question,
        "corpus_size": engine.corpus().len(),
        "hits": hits,
        "answer": answer,
        "actual_results_count": actual_results_count,
        "requested_results_count": state.top_k,
    });

    println!("{}", serde_json::to_string(&output)?);

    Ok(())
}

fn corpus_command(state: &State) -> Result<()> {
    let engine = build_engine(state)?;
    for sentence in engine.corpus() {
        println!("{}", sentence);
    }
    Ok(())
}

fn report_command(state: &State) -> Result<()> {
    let records = load_transactions(Path::new(&state.path))?;
    for (month, total) in monthly_spending(&records) {
        println!("{} {}", month, total);
    }
    Ok(())
}

fn config_command(state: &State) -> Result<()> {
    state.print_config();
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let state = State::new()?;

    match args.command {
        Commands::Chat => chat_command(&state)?,
        Commands::Ask { question } => ask_command(&state, &question)?,
        Commands::Corpus => corpus_command(&state)?,
        Commands::Report => report_command(&state)?,
        Commands::Config => config_command(&state)?,
    }
    Ok(())
}
