mod error;
pub mod mealplan;
pub mod pantry;
pub mod recipe;
pub mod unit;

pub use error::*;
