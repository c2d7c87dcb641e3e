use std::collections::BTreeMap;

use vorrat_shared::pantry::AliasRule;

/// Lower-cases a name and collapses inner whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Outcome of [`AliasTable::define`], so callers can persist the exact
/// same change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasChange {
    pub alias: String,
    pub canonical: String,
    /// Aliases that used to point at `alias` and now point at `canonical`.
    pub repointed: Vec<String>,
}

/// Per-owner mapping from alias name to canonical ingredient name.
///
/// Chains are collapsed on every [`define`](AliasTable::define), so a
/// lookup is always a single step and can never loop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads stored rules as they are. Rules are expected to be flat
    /// already; a stale chain only costs one extra step of resolution.
    pub fn from_rules(rules: impl IntoIterator<Item = AliasRule>) -> Self {
        let aliases = rules
            .into_iter()
            .map(|rule| {
                (
                    normalize_name(&rule.alias_name),
                    normalize_name(&rule.canonical_name),
                )
            })
            .filter(|(alias, canonical)| !alias.is_empty() && alias != canonical)
            .collect();

        Self { aliases }
    }

    pub fn resolve(&self, name: &str) -> String {
        let key = normalize_name(name);

        match self.aliases.get(&key) {
            Some(canonical) => canonical.to_owned(),
            None => key,
        }
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(&normalize_name(name))
    }

    pub fn define(&mut self, canonical: &str, alias: &str) -> vorrat_shared::Result<AliasChange> {
        let alias = normalize_name(alias);
        let requested = normalize_name(canonical);

        if alias.is_empty() || requested.is_empty() {
            vorrat_shared::bail!("ingredient names must not be empty");
        }

        if alias == requested {
            return Err(vorrat_shared::Error::SelfAlias(alias));
        }

        let canonical = self.resolve(&requested);

        if canonical == alias {
            return Err(vorrat_shared::Error::AliasCycle {
                alias,
                canonical: requested,
            });
        }

        let mut repointed = vec![];

        for (name, target) in self.aliases.iter_mut() {
            if *target == alias {
                *target = canonical.to_owned();
                repointed.push(name.to_owned());
            }
        }

        self.aliases.insert(alias.to_owned(), canonical.to_owned());

        Ok(AliasChange {
            alias,
            canonical,
            repointed,
        })
    }

    pub fn remove(&mut self, alias: &str) -> bool {
        self.aliases.remove(&normalize_name(alias)).is_some()
    }

    /// `(alias, canonical)` pairs ordered by alias.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(alias, canonical)| (alias.as_str(), canonical.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
