use sea_query::{ColumnDef, Index, Table, TableCreateStatement, TableDropStatement};

use crate::table::AliasRule;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(AliasRule::Table)
        .col(
            ColumnDef::new(AliasRule::OwnerId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(ColumnDef::new(AliasRule::AliasName).string().not_null())
        .col(ColumnDef::new(AliasRule::CanonicalName).string().not_null())
        .primary_key(
            Index::create()
                .col(AliasRule::OwnerId)
                .col(AliasRule::AliasName),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(AliasRule::Table).to_owned()
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
