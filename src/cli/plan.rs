use std::path::Path;

use anyhow::Result;
use vorrat_pantry::{Command, Query};
use vorrat_shopping::{NoopMerger, ShoppingAggregator};

use super::{PlanFile, connect, print_json};

pub async fn allocate(config: crate::config::Config, owner: &str, plan: &Path) -> Result<()> {
    let plan = PlanFile::load(plan)?;
    let pool = connect(&config).await?;

    let allocation = Query(pool)
        .allocate(owner, &plan.entries, &plan.recipes)
        .await?;

    print_json(&allocation)
}

pub async fn shopping_list(config: crate::config::Config, owner: &str, plan: &Path) -> Result<()> {
    let plan = PlanFile::load(plan)?;
    let pool = connect(&config).await?;

    let aggregator =
        ShoppingAggregator::new(NoopMerger, config.shopping.semantic_merge_timeout());
    let items = aggregator
        .build_for_plan(&Query(pool), owner, &plan.entries, &plan.recipes)
        .await?;

    print_json(&items)
}

pub async fn cook(
    config: crate::config::Config,
    owner: &str,
    plan: &Path,
    entry_id: &str,
) -> Result<()> {
    let plan = PlanFile::load(plan)?;

    let Some(entry) = plan.entry(entry_id) else {
        anyhow::bail!("entry {entry_id} not found in plan");
    };

    let ingredients = plan
        .recipes
        .get(&entry.recipe_id)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let pool = connect(&config).await?;
    let report = Command(pool).consume(owner, entry, ingredients).await?;

    print_json(&report)
}
