use std::collections::BTreeSet;

use vorrat_shared::pantry::BlockRule;

use crate::{AliasTable, normalize_name};

/// Ingredients an owner never wants to allocate or buy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockList {
    names: BTreeSet<String>,
}

impl BlockList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: impl IntoIterator<Item = BlockRule>) -> Self {
        let names = rules
            .into_iter()
            .map(|rule| normalize_name(&rule.ingredient_name))
            .filter(|name| !name.is_empty())
            .collect();

        Self { names }
    }

    pub fn insert(&mut self, name: &str) -> bool {
        let name = normalize_name(name);
        if name.is_empty() {
            return false;
        }

        self.names.insert(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(&normalize_name(name))
    }

    /// True when either the raw name or its canonical form is blocked.
    pub fn is_blocked(&self, name: &str, aliases: &AliasTable) -> bool {
        self.names.contains(&normalize_name(name)) || self.names.contains(&aliases.resolve(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
