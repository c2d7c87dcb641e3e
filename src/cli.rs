use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use vorrat_shared::mealplan::{PlannedEntry, RecipeBook};

pub mod package;
pub mod pantry;
pub mod plan;

/// A week plan as read from disk.
#[derive(Debug, Default, Deserialize)]
pub struct PlanFile {
    pub entries: Vec<PlannedEntry>,
    #[serde(default)]
    pub recipes: RecipeBook,
}

impl PlanFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse plan {}", path.display()))
    }

    pub fn entry(&self, id: &str) -> Option<&PlannedEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

pub(crate) async fn connect(config: &crate::config::Config) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = crate::db::create_pool(&config.database.url, config.database.max_connections).await?;
    crate::db::migrate(&pool).await?;

    Ok(pool)
}
