use anyhow::Result;
use vorrat_pantry::{AddPantryInput, BlockInput, Command, DefineAliasInput, Query, RestockInput};

use super::{connect, print_json};

pub struct NewStock {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub category: Option<String>,
    pub expiry_date: Option<u64>,
}

pub async fn list(config: crate::config::Config, owner: &str) -> Result<()> {
    let pool = connect(&config).await?;
    let pantry = Query(pool).pantry(owner).await?;

    print_json(&pantry)
}

pub async fn add(
    config: crate::config::Config,
    owner: &str,
    stock: NewStock,
    is_permanent: bool,
) -> Result<()> {
    let pool = connect(&config).await?;
    let entry = Command(pool)
        .add_pantry(
            owner,
            AddPantryInput {
                ingredient_name: stock.name,
                amount: stock.amount,
                unit: stock.unit.into(),
                is_permanent,
                category: stock.category,
                expiry_date: stock.expiry_date,
            },
        )
        .await?;

    print_json(&entry)
}

pub async fn restock(config: crate::config::Config, owner: &str, stock: NewStock) -> Result<()> {
    let pool = connect(&config).await?;
    let outcome = Command(pool)
        .restock(
            owner,
            RestockInput {
                ingredient_name: stock.name,
                amount: stock.amount,
                unit: stock.unit.into(),
                category: stock.category,
                expiry_date: stock.expiry_date,
            },
        )
        .await?;

    print_json(&outcome)
}

pub async fn alias(
    config: crate::config::Config,
    owner: &str,
    canonical: String,
    alias: String,
) -> Result<()> {
    let pool = connect(&config).await?;
    let change = Command(pool)
        .define_alias(
            owner,
            DefineAliasInput {
                canonical_name: canonical,
                alias_name: alias,
            },
        )
        .await?;

    tracing::info!(
        "'{}' now resolves to '{}' ({} aliases repointed)",
        change.alias,
        change.canonical,
        change.repointed.len()
    );

    Ok(())
}

pub async fn unalias(config: crate::config::Config, owner: &str, alias: &str) -> Result<()> {
    let pool = connect(&config).await?;
    Command(pool).remove_alias(owner, alias).await?;

    tracing::info!("alias '{alias}' removed");

    Ok(())
}

pub async fn block(config: crate::config::Config, owner: &str, name: String) -> Result<()> {
    let pool = connect(&config).await?;
    let created = Command(pool)
        .block(
            owner,
            BlockInput {
                ingredient_name: name.to_owned(),
            },
        )
        .await?;

    if created {
        tracing::info!("'{name}' blocked");
    } else {
        tracing::info!("'{name}' was already blocked");
    }

    Ok(())
}

pub async fn unblock(config: crate::config::Config, owner: &str, name: &str) -> Result<()> {
    let pool = connect(&config).await?;

    if !Command(pool).unblock(owner, name).await? {
        tracing::warn!("'{name}' was not blocked");
    }

    Ok(())
}
