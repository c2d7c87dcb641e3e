use vorrat_pantry::{Query, RestockInput};
use vorrat_shared::mealplan::{PlannedEntry, RecipeBook, scale_plan};
use vorrat_shared::recipe::ScaledIngredient;

use crate::{ShoppingAggregator, ShoppingLineItem};

impl ShoppingAggregator {
    /// Shopping list for one owner against their current pantry.
    #[tracing::instrument(skip_all, fields(owner_id = %owner_id, ingredients = ingredients.len()))]
    pub async fn build_for_owner(
        &self,
        query: &Query,
        owner_id: &str,
        ingredients: &[ScaledIngredient],
    ) -> vorrat_shared::Result<Vec<ShoppingLineItem>> {
        let snapshot = query.snapshot(owner_id).await?;

        let items = self
            .build(
                ingredients,
                &snapshot.pantry,
                &snapshot.aliases,
                &snapshot.blocks,
            )
            .await;

        tracing::info!(lines = items.len(), "shopping list built");

        Ok(items)
    }

    /// Same as [`build_for_owner`](Self::build_for_owner) for a whole plan.
    pub async fn build_for_plan(
        &self,
        query: &Query,
        owner_id: &str,
        entries: &[PlannedEntry],
        recipes: &RecipeBook,
    ) -> vorrat_shared::Result<Vec<ShoppingLineItem>> {
        let ingredients = scale_plan(entries, recipes);

        self.build_for_owner(query, owner_id, &ingredients).await
    }
}

/// A bought line goes back into the pantry as-is.
impl From<&ShoppingLineItem> for RestockInput {
    fn from(item: &ShoppingLineItem) -> Self {
        RestockInput {
            ingredient_name: item.ingredient_name.to_owned(),
            amount: item.amount,
            unit: item.unit.clone(),
            category: None,
            expiry_date: None,
        }
    }
}
