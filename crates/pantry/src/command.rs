use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ulid::Ulid;
use validator::Validate;
use vorrat_shared::mealplan::PlannedEntry;
use vorrat_shared::pantry::PantryEntry;
use vorrat_shared::recipe::RecipeIngredient;
use vorrat_shared::unit::{Unit, compatible, to_base};

use crate::{
    AliasChange, AliasTable, BlockList, Draw, RecipeAllocation, Snapshot, normalize_name,
    repository,
};

#[derive(Validate, Clone, Debug, Deserialize)]
pub struct DefineAliasInput {
    #[validate(length(min = 1, max = 120))]
    pub canonical_name: String,
    #[validate(length(min = 1, max = 120))]
    pub alias_name: String,
}

#[derive(Validate, Clone, Debug, Deserialize)]
pub struct BlockInput {
    #[validate(length(min = 1, max = 120))]
    pub ingredient_name: String,
}

#[derive(Validate, Clone, Debug, Deserialize)]
pub struct RestockInput {
    #[validate(length(min = 1, max = 120))]
    pub ingredient_name: String,
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<u64>,
}

#[derive(Validate, Clone, Debug, Deserialize)]
pub struct AddPantryInput {
    #[validate(length(min = 1, max = 120))]
    pub ingredient_name: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub is_permanent: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestockOutcome {
    /// Added to an existing row, `amount` in that row's unit.
    Added { pantry_id: String, amount: f64 },
    Created { pantry_id: String },
    /// A permanent row already covers the ingredient.
    Permanent { pantry_id: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct ConsumeReport {
    pub allocation: RecipeAllocation,
    pub draws: Vec<Draw>,
    /// Rows deleted because they ran empty.
    pub removed: Vec<String>,
}

#[derive(Clone)]
pub struct Command(pub sqlx::SqlitePool);

impl Command {
    #[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn add_pantry(
        &self,
        owner_id: &str,
        input: AddPantryInput,
    ) -> vorrat_shared::Result<PantryEntry> {
        input.validate()?;

        let entry = PantryEntry {
            id: Ulid::new().to_string(),
            owner_id: owner_id.to_owned(),
            ingredient_name: input.ingredient_name.trim().to_owned(),
            amount: input.amount,
            unit: input.unit,
            is_permanent: input.is_permanent,
            category: input.category,
            expiry_date: input.expiry_date,
        };

        repository::insert_pantry(&self.0, &entry).await?;

        Ok(entry)
    }

    #[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn define_alias(
        &self,
        owner_id: &str,
        input: DefineAliasInput,
    ) -> vorrat_shared::Result<AliasChange> {
        input.validate()?;

        let mut tx = self.0.begin().await?;
        let mut table =
            AliasTable::from_rules(repository::find_aliases(&mut *tx, owner_id).await?);
        let change = table.define(&input.canonical_name, &input.alias_name)?;

        repository::repoint_aliases(&mut *tx, owner_id, &change.alias, &change.canonical).await?;
        repository::upsert_alias(&mut *tx, owner_id, &change.alias, &change.canonical).await?;
        tx.commit().await?;

        tracing::info!(
            alias = %change.alias,
            canonical = %change.canonical,
            repointed = change.repointed.len(),
            "alias defined"
        );

        Ok(change)
    }

    #[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn remove_alias(&self, owner_id: &str, alias: &str) -> vorrat_shared::Result<()> {
        let alias = normalize_name(alias);

        if !repository::delete_alias(&self.0, owner_id, &alias).await? {
            vorrat_shared::not_found!("alias '{}' not found", alias);
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn block(&self, owner_id: &str, input: BlockInput) -> vorrat_shared::Result<bool> {
        input.validate()?;

        let name = normalize_name(&input.ingredient_name);
        if name.is_empty() {
            vorrat_shared::bail!("ingredient name must not be empty");
        }

        repository::insert_block(&self.0, owner_id, &name).await
    }

    #[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn unblock(&self, owner_id: &str, name: &str) -> vorrat_shared::Result<bool> {
        repository::delete_block(&self.0, owner_id, &normalize_name(name)).await
    }

    /// Marks one planned meal as cooked: the pantry stock its allocation
    /// covers is taken out of the matching rows, soonest expiry first.
    /// Rows that run empty are deleted unless permanent.
    #[tracing::instrument(skip_all, fields(owner_id = %owner_id, entry_id = %entry.id))]
    pub async fn consume(
        &self,
        owner_id: &str,
        entry: &PlannedEntry,
        ingredients: &[RecipeIngredient],
    ) -> vorrat_shared::Result<ConsumeReport> {
        let mut tx = self.0.begin().await?;

        let snapshot = Snapshot {
            pantry: repository::find_pantry(&mut *tx, owner_id).await?,
            aliases: AliasTable::from_rules(repository::find_aliases(&mut *tx, owner_id).await?),
            blocks: BlockList::from_rules(repository::find_blocks(&mut *tx, owner_id).await?),
        };

        let mut allocator = snapshot.allocator();
        let allocation = allocator.allocate_entry(entry, ingredients);

        let mut covered: BTreeMap<&str, f64> = BTreeMap::new();
        for result in &allocation.ingredients {
            if result.covered_base_amount > 0.0 {
                *covered.entry(result.resolved_name.as_str()).or_default() +=
                    result.covered_base_amount;
            }
        }

        let draws = covered
            .into_iter()
            .filter_map(|(name, amount)| allocator.pool().get(name).map(|e| e.draw(amount)))
            .flatten()
            .collect::<Vec<_>>();

        let mut removed = vec![];

        for draw in &draws {
            repository::add_amount(&mut *tx, owner_id, &draw.pantry_id, -draw.amount).await?;

            if repository::delete_if_empty(&mut *tx, owner_id, &draw.pantry_id).await? {
                removed.push(draw.pantry_id.to_owned());
            }
        }

        tx.commit().await?;

        tracing::info!(
            draws = draws.len(),
            removed = removed.len(),
            "pantry consumed"
        );

        Ok(ConsumeReport {
            allocation,
            draws,
            removed,
        })
    }

    /// Books a purchase back into the pantry: adds to a row with the same
    /// canonical name and a comparable unit, or creates a new row.
    #[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn restock(
        &self,
        owner_id: &str,
        input: RestockInput,
    ) -> vorrat_shared::Result<RestockOutcome> {
        input.validate()?;

        let mut tx = self.0.begin().await?;
        let aliases = AliasTable::from_rules(repository::find_aliases(&mut *tx, owner_id).await?);
        let pantry = repository::find_pantry(&mut *tx, owner_id).await?;

        let resolved = aliases.resolve(&input.ingredient_name);
        let purchased = to_base(input.amount, &input.unit);

        let target = pantry.iter().find_map(|row| {
            if aliases.resolve(&row.ingredient_name) != resolved {
                return None;
            }

            let compat = compatible(&row.unit.base(), &purchased.unit);
            compat.compatible.then_some((row, compat.factor))
        });

        let outcome = match target {
            Some((row, _)) if row.is_permanent => RestockOutcome::Permanent {
                pantry_id: row.id.to_owned(),
            },
            Some((row, factor)) => {
                let amount = purchased.amount * factor / row.unit.base_factor();
                repository::add_amount(&mut *tx, owner_id, &row.id, amount).await?;

                RestockOutcome::Added {
                    pantry_id: row.id.to_owned(),
                    amount,
                }
            }
            None => {
                let entry = PantryEntry {
                    id: Ulid::new().to_string(),
                    owner_id: owner_id.to_owned(),
                    ingredient_name: input.ingredient_name.trim().to_owned(),
                    amount: input.amount,
                    unit: input.unit,
                    is_permanent: false,
                    category: input.category,
                    expiry_date: input.expiry_date,
                };
                repository::insert_pantry(&mut *tx, &entry).await?;

                RestockOutcome::Created { pantry_id: entry.id }
            }
        };

        tx.commit().await?;

        tracing::info!(ingredient = %resolved, ?outcome, "pantry restocked");

        Ok(outcome)
    }
}
