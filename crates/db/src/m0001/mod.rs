mod alias_rule;
mod block_rule;
mod pantry;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "vorrat",
    "m0001",
    vec_box![],
    vec_box![
        pantry::CreateTable,
        pantry::CreateOwnerIdx,
        alias_rule::CreateTable,
        block_rule::CreateTable
    ]
);
