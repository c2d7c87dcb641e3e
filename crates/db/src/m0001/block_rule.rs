use sea_query::{ColumnDef, Index, Table, TableCreateStatement, TableDropStatement};

use crate::table::BlockRule;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(BlockRule::Table)
        .col(
            ColumnDef::new(BlockRule::OwnerId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(ColumnDef::new(BlockRule::IngredientName).string().not_null())
        .primary_key(
            Index::create()
                .col(BlockRule::OwnerId)
                .col(BlockRule::IngredientName),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(BlockRule::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateTable {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
