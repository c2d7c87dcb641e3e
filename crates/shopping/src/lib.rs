mod aggregation;
mod merger;
mod offer;
mod package;

pub use aggregation::*;
pub use merger::*;
pub use offer::*;
pub use package::*;

cfg_if::cfg_if! {
    if #[cfg(feature = "full")] {
        mod query;

        pub use query::*;
    }
}
