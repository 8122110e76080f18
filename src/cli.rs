//! Interactive chat and one-shot front-ends

use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::cities::CITIES;
use crate::rag::RagPipeline;

/// Interactive chat loop on stdin/stdout.
pub async fn chat(pipeline: &RagPipeline) -> Result<()> {
    print_banner();

    let stdin = io::stdin();
    loop {
        print!("🔍 You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("\n👋 Goodbye!");
            break;
        }

        let outcome = pipeline.predict(query).await;
        match outcome.response {
            Some(response) if outcome.success => {
                println!("\n🤖 Assistant: {response}\n");
            }
            _ => {
                println!(
                    "\n❌ Error: {}\n",
                    outcome.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
        }
    }

    Ok(())
}

/// Answer one query and print the structured result as JSON, for use by
/// subprocess callers.
pub async fn ask(pipeline: &RagPipeline, query: &str) -> Result<()> {
    let outcome = pipeline.predict(query).await;
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

fn print_banner() {
    let cities: Vec<&str> = CITIES.iter().map(|c| c.name).collect();

    println!();
    println!("======================================================================");
    println!("🌤️   WEATHER PREDICTION CLI - RAG Enhanced");
    println!("======================================================================");
    println!();
    println!("Features:");
    println!("  • Live weather data from OpenWeather API");
    println!("  • Live AQI (Air Quality Index) monitoring");
    println!("  • 5-day weather forecast");
    println!("  • AI-powered responses from a local language model");
    println!("  • Internet search integration");
    println!();
    println!("Commands:");
    println!("  • Ask for weather: \"What is the weather in Kolkata?\"");
    println!("  • Ask for forecast: \"Weather forecast for Delhi for next 5 days\"");
    println!("  • Ask for AQI: \"Current AQI in Mumbai\"");
    println!("  • Ask general questions: \"Why is pollution high in Delhi?\"");
    println!("  • Type \"quit\" to exit");
    println!();
    println!("Available cities: {}", cities.join(", "));
    println!("======================================================================");
    println!();
}
