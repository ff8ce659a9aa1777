//! `localclaw chat` — interactive REPL or one-shot message.

use localclaw_agent::AgentCore;
use localclaw_config::AppSettings;
use std::io::{BufRead, Write};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let settings = AppSettings::load()?;
    let mut agent = AgentCore::new(settings)?;

    if let Some(msg) = message {
        let response = agent.handle_message(&msg).await?;
        println!("{}", response.answer);
        return Ok(());
    }

    println!("localclaw — type a message, /trace for the last reasoning trace, /quit to exit.");

    if !agent.health_check().await {
        println!("⚠️  Ollama is not reachable (or the model is missing). Replies will fail until it is up.");
    }

    if let Some(suggestion) = agent.get_proactive_message().await {
        println!("\nclaw> {suggestion}");
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\nyou> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let input = line?.trim().to_string();

        match input.as_str() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/trace" => {
                print_trace(&agent);
                continue;
            }
            _ => {}
        }

        match agent.handle_message(&input).await {
            Ok(response) => println!("claw> {}", response.answer),
            Err(e) => println!("claw> I couldn't process that: {e}"),
        }

        if let Some(suggestion) = agent.get_proactive_message().await {
            println!("claw> {suggestion}");
        }
    }

    Ok(())
}

fn print_trace(agent: &AgentCore) {
    let trace = agent.get_thought_trace();
    if trace.is_empty() {
        println!("No reasoning trace yet.");
        return;
    }

    for step in trace {
        println!("--- iteration {} ---", step.iteration);
        println!("thought:     {}", step.thought);
        if let Some(action) = &step.action {
            println!(
                "action:      {}({})",
                action,
                step.action_input.as_deref().unwrap_or("")
            );
        }
        if let Some(observation) = &step.observation {
            println!("observation: {observation}");
        }
    }
}
