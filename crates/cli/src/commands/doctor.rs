//! `localclaw doctor` — diagnose backend health.

use localclaw_agent::AgentCore;
use localclaw_config::AppSettings;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = AppSettings::load()?;
    println!("localclaw doctor");
    println!("================");
    println!("  Config:   {}", AppSettings::config_path().display());
    println!("  Data dir: {}", AppSettings::data_dir().display());
    println!("  Backend:  {}", settings.ollama.base_url);
    println!("  Model:    {}", settings.ollama.model);
    println!();

    let agent = AgentCore::new(settings)?;

    if agent.health_check().await {
        println!("✅ Ollama is reachable and the model is available.");
    } else {
        println!("❌ Ollama is not reachable, or the configured model is missing.");
        println!("   Start it with: ollama serve");
    }

    match agent.list_models().await {
        Ok(models) if !models.is_empty() => {
            println!("\nLocal models:");
            for model in models {
                println!("  - {model}");
            }
        }
        Ok(_) => println!("\nNo local models found. Pull one with: ollama pull phi4-mini"),
        Err(e) => println!("\nCould not list models: {e}"),
    }

    Ok(())
}
