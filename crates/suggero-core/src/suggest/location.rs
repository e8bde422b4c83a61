//! Location cache: one record per reached (word index, trie node) pair.
//!
//! The same location is reached by many distinct edit paths with distinct
//! costs; the cache merges them so a location's subtree is expanded at most
//! once. Records live in an arena; the index is a position-keyed vector of
//! per-node maps, since a word index is always in `0..=query_len`.

use std::collections::HashMap;

use suggero_trie::NodeId;

use super::search::{EdgeId, PathId};
use super::Cost;

/// Handle into the location arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocId(u32);

impl LocId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One way the trie below a location completes into a dictionary word:
/// the remaining characters plus the cost of consuming whatever is left of
/// the query along the way.
#[derive(Debug, Clone)]
pub(crate) struct Suffix {
    pub text: String,
    pub cost: Cost,
}

#[derive(Debug, Default)]
pub(crate) struct Location {
    /// Incoming spellings: word-so-far → the path that reached here with it.
    pub incoming: HashMap<String, PathId>,
    /// Cheapest known incoming path; the only one that expands the subtree.
    pub rep: Option<PathId>,
    /// Resolved base cost: set once the representative has fully expanded.
    /// Later arrivals at a cost at or above this are answered from
    /// `suffixes` instead of re-expanding.
    pub sbc: Option<Cost>,
    /// Known completions of the subtree below this location. Append-only
    /// once `sbc` is set.
    pub suffixes: Vec<Suffix>,
    /// Edges combining through this location; re-notified on every append.
    pub subscribers: Vec<EdgeId>,
    /// Whether the zero-cost empty completion has been registered.
    pub has_trivial: bool,
}

pub(crate) struct LocationCache {
    by_index: Vec<HashMap<NodeId, LocId>>,
    arena: Vec<Location>,
}

impl LocationCache {
    pub fn new(query_len: usize) -> Self {
        Self {
            by_index: vec![HashMap::new(); query_len + 1],
            arena: Vec::new(),
        }
    }

    pub fn get_or_insert(&mut self, index: usize, node: NodeId) -> LocId {
        let arena = &mut self.arena;
        *self.by_index[index].entry(node).or_insert_with(|| {
            let id = LocId(arena.len() as u32);
            arena.push(Location::default());
            id
        })
    }

    pub fn get(&self, id: LocId) -> &Location {
        &self.arena[id.idx()]
    }

    pub fn get_mut(&mut self, id: LocId) -> &mut Location {
        &mut self.arena[id.idx()]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }
}
