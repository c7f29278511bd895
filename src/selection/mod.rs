// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to turn user selections (e.g. "0~3,!2" or "DV*") into concrete sets
//! of IDs.
//!
//! The grammar is a comma-separated list of tokens. A token is one of:
//! - an integer (e.g. `3`);
//! - a name, looked up in a [`NameTable`] (e.g. `DV04`);
//! - a glob-style name pattern (e.g. `DV0*`);
//! - an inclusive range (e.g. `0~3`);
//! - a wildcard `*`, which is everything available;
//! - a negation of any of the above (e.g. `!2`).
//!
//! All of the positive tokens are accumulated first, then all negated IDs are
//! removed, and finally the IDs are de-duplicated and sorted. If the first
//! token is a negation, the positive base is everything available.

mod error;
#[cfg(test)]
mod tests;

pub use error::SelectionError;

use glob::{MatchOptions, Pattern};
use indexmap::IndexMap;
use itertools::Itertools;
use log::trace;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// The thing being selected. This is only used to give errors some context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
pub enum Dimension {
    #[strum(serialize = "antenna")]
    Antenna,

    #[strum(serialize = "spw")]
    Spw,

    #[strum(serialize = "field")]
    Field,

    #[strum(serialize = "time range")]
    TimeRange,

    #[strum(serialize = "polarisation")]
    Polarisation,
}

/// What should an empty selection resolve to? Different dimensions have
/// different conventions; e.g. an empty antenna selection means "all
/// antennas", but an empty flagging selection means "flag nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyMeans {
    All,
    None,
}

/// A user's selection before it has been resolved. In argument files this
/// may be a string, an integer or a list of integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionSpec {
    Text(String),
    Id(usize),
    Ids(Vec<usize>),
}

impl From<&str> for SelectionSpec {
    fn from(s: &str) -> Self {
        SelectionSpec::Text(s.to_string())
    }
}

impl From<String> for SelectionSpec {
    fn from(s: String) -> Self {
        SelectionSpec::Text(s)
    }
}

impl From<usize> for SelectionSpec {
    fn from(i: usize) -> Self {
        SelectionSpec::Id(i)
    }
}

impl From<Vec<usize>> for SelectionSpec {
    fn from(v: Vec<usize>) -> Self {
        SelectionSpec::Ids(v)
    }
}

impl From<&[usize]> for SelectionSpec {
    fn from(v: &[usize]) -> Self {
        SelectionSpec::Ids(v.to_vec())
    }
}

/// A resolved selection. The IDs are always sorted in ascending order and
/// contain no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection(Vec<usize>);

impl Selection {
    /// Sort and de-duplicate the supplied IDs.
    pub fn from_unsorted(mut ids: Vec<usize>) -> Selection {
        ids.sort_unstable();
        ids.dedup();
        Selection(ids)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Names associated with IDs (e.g. antenna names). Lookups are
/// case-insensitive. A name may refer to more than one ID.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: IndexMap<String, Vec<usize>>,
}

impl NameTable {
    pub fn new() -> NameTable {
        NameTable::default()
    }

    /// Make a table where each name's ID is its position in the iterator.
    pub fn from_names<I, S>(names: I) -> NameTable
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = NameTable::new();
        for (i, name) in names.into_iter().enumerate() {
            table.insert(name, i);
        }
        table
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, id: usize) {
        let ids = self.names.entry(name.into()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Get the IDs associated with `name`, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&[usize]> {
        self.names
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, ids)| ids.as_slice())
    }

    /// Get the IDs of all names matching a glob pattern, ignoring case.
    pub fn matching(&self, pattern: &Pattern) -> Vec<usize> {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.names
            .iter()
            .filter(|(n, _)| pattern.matches_with(n, options))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }

    /// The first name associated with `id`, if any.
    pub fn name_of(&self, id: usize) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A single parsed (but not yet expanded) token.
#[derive(Debug, PartialEq, Eq)]
enum Term<'s> {
    Id(usize),
    Range(usize, usize),
    All,
    Name(&'s str),
    Pattern(&'s str),
}

/// Resolves [`SelectionSpec`]s for a single [`Dimension`] against the IDs that
/// are actually available (the "universe").
#[derive(Debug, Clone, Copy)]
pub struct SelectionResolver<'a> {
    dimension: Dimension,
    universe: &'a [usize],
    names: Option<&'a NameTable>,
    empty: EmptyMeans,
}

impl<'a> SelectionResolver<'a> {
    pub fn new(dimension: Dimension, universe: &'a [usize]) -> SelectionResolver<'a> {
        SelectionResolver {
            dimension,
            universe,
            names: None,
            empty: EmptyMeans::All,
        }
    }

    pub fn with_names(self, names: &'a NameTable) -> SelectionResolver<'a> {
        SelectionResolver {
            names: Some(names),
            ..self
        }
    }

    pub fn empty_means(self, empty: EmptyMeans) -> SelectionResolver<'a> {
        SelectionResolver { empty, ..self }
    }

    pub fn resolve(&self, spec: &SelectionSpec) -> Result<Selection, SelectionError> {
        trace!("Resolving {} selection {spec:?}", self.dimension);
        match spec {
            SelectionSpec::Id(id) => self.expand(&Term::Id(*id), &id.to_string()).map(Selection),
            SelectionSpec::Ids(ids) => {
                if ids.is_empty() {
                    return Ok(self.empty_selection());
                }
                let mut out = Vec::with_capacity(ids.len());
                for id in ids {
                    out.extend(self.expand(&Term::Id(*id), &id.to_string())?);
                }
                Ok(Selection::from_unsorted(out))
            }
            SelectionSpec::Text(s) => self.resolve_str(s),
        }
    }

    fn empty_selection(&self) -> Selection {
        match self.empty {
            EmptyMeans::All => Selection::from_unsorted(self.universe.to_vec()),
            EmptyMeans::None => Selection::default(),
        }
    }

    fn resolve_str(&self, s: &str) -> Result<Selection, SelectionError> {
        let tokens = s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>();
        if tokens.is_empty() {
            return Ok(self.empty_selection());
        }

        let mut base: Vec<usize> = vec![];
        let mut removed: Vec<usize> = vec![];
        let mut negated = false;
        for (i_token, token) in tokens.iter().enumerate() {
            let (negation, term) = self.parse_token(token)?;
            let ids = self.expand(&term, token)?;
            if negation {
                if i_token == 0 {
                    base.extend_from_slice(self.universe);
                }
                negated = true;
                removed.extend(ids);
            } else {
                base.extend(ids);
            }
        }

        base.retain(|id| !removed.contains(id));
        let selection = Selection::from_unsorted(base);
        if selection.is_empty() && negated {
            return Err(SelectionError::Empty {
                dimension: self.dimension,
                spec: s.to_string(),
            });
        }
        trace!(
            "{} selection '{s}' resolved to [{}]",
            self.dimension,
            selection.iter().join(", ")
        );
        Ok(selection)
    }

    fn parse_token<'s>(&self, token: &'s str) -> Result<(bool, Term<'s>), SelectionError> {
        let parse_err = || SelectionError::Parse {
            dimension: self.dimension,
            token: token.to_string(),
        };

        let (negation, rest) = match token.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, token),
        };
        if rest.is_empty() || rest.starts_with('!') {
            return Err(parse_err());
        }

        if rest == "*" {
            return Ok((negation, Term::All));
        }

        if rest.contains('~') {
            let range_err = || SelectionError::RangeParse {
                dimension: self.dimension,
                token: token.to_string(),
            };
            let mut split = rest.split('~');
            let (lo, hi) = match (split.next(), split.next(), split.next()) {
                (Some(lo), Some(hi), None) => (lo.trim(), hi.trim()),
                _ => return Err(parse_err()),
            };
            let lo: usize = lo.parse().map_err(|_| range_err())?;
            let hi: usize = hi.parse().map_err(|_| range_err())?;
            if lo > hi {
                return Err(range_err());
            }
            return Ok((negation, Term::Range(lo, hi)));
        }

        if let Ok(id) = rest.parse::<usize>() {
            return Ok((negation, Term::Id(id)));
        }

        if rest.contains(|c| matches!(c, '*' | '?' | '[')) {
            Ok((negation, Term::Pattern(rest)))
        } else {
            Ok((negation, Term::Name(rest)))
        }
    }

    /// Turn a term into the IDs it refers to. Every returned ID is in the
    /// universe.
    fn expand(&self, term: &Term, token: &str) -> Result<Vec<usize>, SelectionError> {
        let no_match = || SelectionError::NoMatch {
            dimension: self.dimension,
            token: token.to_string(),
            universe: self.universe.to_vec(),
        };
        let unknown_name = |name: &str| SelectionError::UnknownName {
            dimension: self.dimension,
            name: name.to_string(),
        };

        let ids = match term {
            Term::Id(id) => {
                if !self.universe.contains(id) {
                    return Err(no_match());
                }
                vec![*id]
            }

            Term::Range(lo, hi) => self
                .universe
                .iter()
                .copied()
                .filter(|id| (*lo..=*hi).contains(id))
                .collect(),

            Term::All => self.universe.to_vec(),

            Term::Name(name) => match self.names.and_then(|n| n.lookup(name)) {
                Some(ids) => ids
                    .iter()
                    .copied()
                    .filter(|id| self.universe.contains(id))
                    .collect(),
                None => return Err(unknown_name(name)),
            },

            Term::Pattern(pattern) => {
                let names = self.names.ok_or_else(|| unknown_name(pattern))?;
                let glob = Pattern::new(pattern).map_err(|_| SelectionError::Parse {
                    dimension: self.dimension,
                    token: token.to_string(),
                })?;
                let matched = names.matching(&glob);
                if matched.is_empty() {
                    return Err(unknown_name(pattern));
                }
                matched
                    .into_iter()
                    .filter(|id| self.universe.contains(id))
                    .collect()
            }
        };

        if ids.is_empty() && !self.universe.is_empty() {
            return Err(no_match());
        }
        Ok(ids)
    }
}
