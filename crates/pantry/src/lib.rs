mod alias;
mod allocator;
mod exclusion;

pub use alias::*;
pub use allocator::*;
pub use exclusion::*;

cfg_if::cfg_if! {
    if #[cfg(feature = "full")] {
        mod command;
        mod query;
        mod repository;

        pub use command::*;
        pub use query::*;
    }
}
