use vorrat_shared::mealplan::{PlannedEntry, RecipeBook};
use vorrat_shared::pantry::PantryEntry;

use crate::{AliasTable, Allocation, BlockList, PantryAllocator, repository};

/// Everything the engine needs to know about one owner, read at one point
/// in time.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub pantry: Vec<PantryEntry>,
    pub aliases: AliasTable,
    pub blocks: BlockList,
}

impl Snapshot {
    pub fn allocator(&self) -> PantryAllocator<'_> {
        PantryAllocator::new(&self.pantry, &self.aliases, &self.blocks)
    }
}

#[derive(Clone)]
pub struct Query(pub sqlx::SqlitePool);

impl Query {
    pub async fn snapshot(&self, owner_id: &str) -> vorrat_shared::Result<Snapshot> {
        let pantry = repository::find_pantry(&self.0, owner_id).await?;
        let aliases = AliasTable::from_rules(repository::find_aliases(&self.0, owner_id).await?);
        let blocks = BlockList::from_rules(repository::find_blocks(&self.0, owner_id).await?);

        Ok(Snapshot {
            pantry,
            aliases,
            blocks,
        })
    }

    pub async fn pantry(&self, owner_id: &str) -> vorrat_shared::Result<Vec<PantryEntry>> {
        repository::find_pantry(&self.0, owner_id).await
    }

    pub async fn aliases(&self, owner_id: &str) -> vorrat_shared::Result<AliasTable> {
        Ok(AliasTable::from_rules(
            repository::find_aliases(&self.0, owner_id).await?,
        ))
    }

    pub async fn blocks(&self, owner_id: &str) -> vorrat_shared::Result<BlockList> {
        Ok(BlockList::from_rules(
            repository::find_blocks(&self.0, owner_id).await?,
        ))
    }

    /// Coverage report for a whole plan. Nothing is written.
    #[tracing::instrument(skip_all, fields(owner_id = %owner_id, entries = entries.len()))]
    pub async fn allocate(
        &self,
        owner_id: &str,
        entries: &[PlannedEntry],
        recipes: &RecipeBook,
    ) -> vorrat_shared::Result<Allocation> {
        let snapshot = self.snapshot(owner_id).await?;

        Ok(snapshot.allocator().allocate(entries, recipes))
    }
}
