//! `localclaw todo` — show to-do lists.

use localclaw_config::AppSettings;
use localclaw_todo::{TodoStatus, TodoStore};
use std::collections::BTreeMap;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = TodoStore::new(AppSettings::todos_path());
    let items = store.get_all().await;

    if items.is_empty() {
        println!("No lists or tasks exist yet.");
        return Ok(());
    }

    let mut grouped: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for item in items {
        grouped.entry(item.category.clone()).or_default().push(item);
    }

    for (category, items) in grouped {
        println!("== {category} ==");
        for item in items {
            let mark = match item.status {
                TodoStatus::Done => "[x]",
                TodoStatus::Pending => "[ ]",
            };
            println!("  {mark} {} | {}", item.id, item.text);
        }
        println!();
    }
    Ok(())
}
