//! `localclaw memory` — inspect the long-term store.

use localclaw_config::AppSettings;
use localclaw_core::vector::VectorStore;
use localclaw_memory::FileStore;

fn open_store() -> FileStore {
    FileStore::new(AppSettings::memory_path())
}

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store();
    let records = store.get_all().await?;

    if records.is_empty() {
        println!("No memories stored yet.");
        return Ok(());
    }

    println!("🧠 {} stored memories", records.len());
    for record in records {
        let stored_at = record
            .metadata
            .get("stored_at")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        println!("  {} | {} | {}", record.id, stored_at, record.text);
    }
    Ok(())
}

pub async fn query(query: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store();
    let results = store.query(query, limit).await?;

    if results.is_empty() {
        println!("No memories found for \"{query}\".");
        return Ok(());
    }

    println!("🔍 Results for \"{query}\":");
    for (i, result) in results.iter().enumerate() {
        println!(
            "  {:>2}. [distance: {:.3}] {}",
            i + 1,
            result.distance,
            result.text
        );
    }
    Ok(())
}

pub async fn delete(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store();
    let before = store.count().await?;
    store.delete(id).await?;
    let after = store.count().await?;

    if after < before {
        println!("Deleted memory '{id}'.");
    } else {
        println!("No memory with id '{id}'.");
    }
    Ok(())
}
