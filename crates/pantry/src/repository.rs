use sea_query::{Expr, ExprTrait, OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::prelude::FromRow;
use vorrat_db::table::{AliasRule, BlockRule, Pantry};
use vorrat_shared::pantry::{self, PantryEntry};
use vorrat_shared::unit::Unit;

/// Amounts at or below this are treated as an empty row.
const EMPTY_EPSILON: f64 = 1e-9;

#[derive(FromRow)]
pub struct PantryRow {
    pub id: String,
    pub owner_id: String,
    pub ingredient_name: String,
    pub amount: f64,
    pub unit: sqlx::types::Text<Unit>,
    pub is_permanent: bool,
    pub category: Option<String>,
    pub expiry_date: Option<i64>,
}

impl From<PantryRow> for PantryEntry {
    fn from(row: PantryRow) -> Self {
        PantryEntry {
            id: row.id,
            owner_id: row.owner_id,
            ingredient_name: row.ingredient_name,
            amount: row.amount,
            unit: row.unit.0,
            is_permanent: row.is_permanent,
            category: row.category,
            expiry_date: row.expiry_date.and_then(|v| u64::try_from(v).ok()),
        }
    }
}

pub(crate) async fn find_pantry<'c, E>(
    executor: E,
    owner_id: &str,
) -> vorrat_shared::Result<Vec<PantryEntry>>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::select()
        .columns([
            Pantry::Id,
            Pantry::OwnerId,
            Pantry::IngredientName,
            Pantry::Amount,
            Pantry::Unit,
            Pantry::IsPermanent,
            Pantry::Category,
            Pantry::ExpiryDate,
        ])
        .from(Pantry::Table)
        .and_where(Expr::col(Pantry::OwnerId).eq(owner_id))
        .order_by(Pantry::Id, sea_query::Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    let rows = sqlx::query_as_with::<_, PantryRow, _>(&sql, values)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub(crate) async fn find_aliases<'c, E>(
    executor: E,
    owner_id: &str,
) -> vorrat_shared::Result<Vec<pantry::AliasRule>>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::select()
        .columns([AliasRule::AliasName, AliasRule::CanonicalName])
        .from(AliasRule::Table)
        .and_where(Expr::col(AliasRule::OwnerId).eq(owner_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    let rows = sqlx::query_as_with::<_, (String, String), _>(&sql, values)
        .fetch_all(executor)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(alias_name, canonical_name)| pantry::AliasRule {
            owner_id: owner_id.to_owned(),
            canonical_name,
            alias_name,
        })
        .collect())
}

pub(crate) async fn find_blocks<'c, E>(
    executor: E,
    owner_id: &str,
) -> vorrat_shared::Result<Vec<pantry::BlockRule>>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::select()
        .column(BlockRule::IngredientName)
        .from(BlockRule::Table)
        .and_where(Expr::col(BlockRule::OwnerId).eq(owner_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    let rows = sqlx::query_as_with::<_, (String,), _>(&sql, values)
        .fetch_all(executor)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(ingredient_name,)| pantry::BlockRule {
            owner_id: owner_id.to_owned(),
            ingredient_name,
        })
        .collect())
}

pub(crate) async fn repoint_aliases<'c, E>(
    executor: E,
    owner_id: &str,
    from: &str,
    to: &str,
) -> vorrat_shared::Result<u64>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::update()
        .table(AliasRule::Table)
        .value(AliasRule::CanonicalName, to)
        .and_where(Expr::col(AliasRule::OwnerId).eq(owner_id))
        .and_where(Expr::col(AliasRule::CanonicalName).eq(from))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(result.rows_affected())
}

pub(crate) async fn upsert_alias<'c, E>(
    executor: E,
    owner_id: &str,
    alias: &str,
    canonical: &str,
) -> vorrat_shared::Result<()>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::insert()
        .into_table(AliasRule::Table)
        .columns([
            AliasRule::OwnerId,
            AliasRule::AliasName,
            AliasRule::CanonicalName,
        ])
        .values_panic([owner_id.into(), alias.into(), canonical.into()])
        .on_conflict(
            OnConflict::columns([AliasRule::OwnerId, AliasRule::AliasName])
                .update_column(AliasRule::CanonicalName)
                .to_owned(),
        )
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(())
}

pub(crate) async fn delete_alias<'c, E>(
    executor: E,
    owner_id: &str,
    alias: &str,
) -> vorrat_shared::Result<bool>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::delete()
        .from_table(AliasRule::Table)
        .and_where(Expr::col(AliasRule::OwnerId).eq(owner_id))
        .and_where(Expr::col(AliasRule::AliasName).eq(alias))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn insert_block<'c, E>(
    executor: E,
    owner_id: &str,
    name: &str,
) -> vorrat_shared::Result<bool>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::insert()
        .into_table(BlockRule::Table)
        .columns([BlockRule::OwnerId, BlockRule::IngredientName])
        .values_panic([owner_id.into(), name.into()])
        .on_conflict(
            OnConflict::columns([BlockRule::OwnerId, BlockRule::IngredientName])
                .do_nothing()
                .to_owned(),
        )
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_block<'c, E>(
    executor: E,
    owner_id: &str,
    name: &str,
) -> vorrat_shared::Result<bool>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::delete()
        .from_table(BlockRule::Table)
        .and_where(Expr::col(BlockRule::OwnerId).eq(owner_id))
        .and_where(Expr::col(BlockRule::IngredientName).eq(name))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn insert_pantry<'c, E>(
    executor: E,
    entry: &PantryEntry,
) -> vorrat_shared::Result<()>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let expiry_date = entry.expiry_date.and_then(|v| i64::try_from(v).ok());
    let statement = Query::insert()
        .into_table(Pantry::Table)
        .columns([
            Pantry::Id,
            Pantry::OwnerId,
            Pantry::IngredientName,
            Pantry::Amount,
            Pantry::Unit,
            Pantry::IsPermanent,
            Pantry::Category,
            Pantry::ExpiryDate,
        ])
        .values_panic([
            entry.id.to_owned().into(),
            entry.owner_id.to_owned().into(),
            entry.ingredient_name.to_owned().into(),
            entry.amount.into(),
            entry.unit.to_string().into(),
            entry.is_permanent.into(),
            entry.category.to_owned().into(),
            expiry_date.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(())
}

/// `amount = amount + delta` in a single statement, so concurrent writers
/// never overwrite each other's change. Permanent rows are left alone.
pub(crate) async fn add_amount<'c, E>(
    executor: E,
    owner_id: &str,
    id: &str,
    delta: f64,
) -> vorrat_shared::Result<bool>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::update()
        .table(Pantry::Table)
        .value(Pantry::Amount, Expr::col(Pantry::Amount).add(delta))
        .and_where(Expr::col(Pantry::OwnerId).eq(owner_id))
        .and_where(Expr::col(Pantry::Id).eq(id))
        .and_where(Expr::col(Pantry::IsPermanent).eq(false))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_if_empty<'c, E>(
    executor: E,
    owner_id: &str,
    id: &str,
) -> vorrat_shared::Result<bool>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let statement = Query::delete()
        .from_table(Pantry::Table)
        .and_where(Expr::col(Pantry::OwnerId).eq(owner_id))
        .and_where(Expr::col(Pantry::Id).eq(id))
        .and_where(Expr::col(Pantry::IsPermanent).eq(false))
        .and_where(Expr::col(Pantry::Amount).lte(EMPTY_EPSILON))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(result.rows_affected() > 0)
}
