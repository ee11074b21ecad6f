//! Selector evaluation
//!
//! A selector is the ordered list of tokens the user passed to pick resources:
//! `all`, an exact name, or `substr:<pattern>`.

use super::model::{ContainerGroup, Resource};

/// Wildcard token, only honoured in first position
pub const ALL: &str = "all";

/// Prefix of a substring token
pub const SUBSTR_PREFIX: &str = "substr:";

/// Anything a selector can be evaluated against
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Resource {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ContainerGroup {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered selector tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tokens: Vec<String>,
}

impl Selector {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a whitespace separated group, as typed on the command line
    pub fn parse(group: &str) -> Self {
        Self::new(group.split_whitespace())
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// True when nothing was requested: no tokens, or a single empty token
    pub fn is_empty(&self) -> bool {
        match self.tokens.as_slice() {
            [] => true,
            [only] => only.is_empty(),
            _ => false,
        }
    }

    pub fn includes<N: Named + ?Sized>(&self, item: &N) -> bool {
        should_include(item, &self.tokens)
    }
}

/// Decide whether `item` is selected by `selectors`.
///
/// Evaluated in order, first hit wins:
/// 1. `all` as the first token
/// 2. exact name equality with any token
/// 3. any `substr:` token whose pattern occurs in the name (case-sensitive)
pub fn should_include<N: Named + ?Sized>(item: &N, selectors: &[String]) -> bool {
    if selectors.first().is_some_and(|s| s == ALL) {
        return true;
    }

    let name = item.name();
    if selectors.iter().any(|s| s == name) {
        return true;
    }

    selectors
        .iter()
        .filter_map(|s| s.strip_prefix(SUBSTR_PREFIX))
        .any(|pattern| name.contains(pattern))
}
