use sea_query::{
    ColumnDef, Index, IndexCreateStatement, IndexDropStatement, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::Pantry;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Pantry::Table)
        .col(
            ColumnDef::new(Pantry::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(Pantry::OwnerId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(ColumnDef::new(Pantry::IngredientName).string().not_null())
        .col(ColumnDef::new(Pantry::Amount).double().not_null())
        .col(ColumnDef::new(Pantry::Unit).string().not_null().default(""))
        .col(
            ColumnDef::new(Pantry::IsPermanent)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(Pantry::Category).string().null())
        .col(ColumnDef::new(Pantry::ExpiryDate).big_integer().null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Pantry::Table).to_owned()
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

pub struct CreateOwnerIdx;

fn create_owner_idx() -> IndexCreateStatement {
    Index::create()
        .name("idx_pantry_owner_id_ingredient_name")
        .table(Pantry::Table)
        .col(Pantry::OwnerId)
        .col(Pantry::IngredientName)
        .to_owned()
}

fn drop_owner_idx() -> IndexDropStatement {
    Index::drop()
        .name("idx_pantry_owner_id_ingredient_name")
        .table(Pantry::Table)
        .to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateOwnerIdx {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_owner_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_owner_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
