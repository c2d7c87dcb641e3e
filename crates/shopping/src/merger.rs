use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vorrat_shared::unit::Unit;

/// One `(name, amount, unit)` tuple handed to a [`SemanticMerger`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeCandidate {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: Unit,
}

/// Collapses lines that share an ingredient but not a unit ("200 g Mehl"
/// and "3 EL Mehl") into fewer lines.
///
/// Implementations are usually remote and slow. The aggregator bounds every
/// call with a timeout and keeps the lines separate when the call fails,
/// times out or returns something unusable.
#[async_trait]
pub trait SemanticMerger: Send + Sync {
    async fn merge(&self, items: &[MergeCandidate]) -> anyhow::Result<Vec<MergeCandidate>>;
}

/// Returns its input unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMerger;

#[async_trait]
impl SemanticMerger for NoopMerger {
    async fn merge(&self, items: &[MergeCandidate]) -> anyhow::Result<Vec<MergeCandidate>> {
        Ok(items.to_vec())
    }
}

#[async_trait]
impl<T: SemanticMerger + ?Sized> SemanticMerger for Arc<T> {
    async fn merge(&self, items: &[MergeCandidate]) -> anyhow::Result<Vec<MergeCandidate>> {
        (**self).merge(items).await
    }
}
