use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum Pantry {
    Table,
    Id,
    OwnerId,
    IngredientName,
    Amount,
    Unit,
    IsPermanent,
    Category,
    ExpiryDate,
}

#[derive(Iden, Clone)]
pub enum AliasRule {
    Table,
    OwnerId,
    AliasName,
    CanonicalName,
}

#[derive(Iden, Clone)]
pub enum BlockRule {
    Table,
    OwnerId,
    IngredientName,
}
