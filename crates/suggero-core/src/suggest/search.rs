//! Best-first search over the joint (query position × trie node) space.
//!
//! Each frontier entry is an edit path: a trie node, a position in the query,
//! the word spelled so far, and the accumulated cost. Expansion applies the
//! edit operations; arrivals are merged per location so a dictionary subtree
//! is walked at most once, with its completions replayed for every other
//! path that reaches the same location. Completions flow upward through the
//! parent edges as suffix records, and every completed word is checked
//! against the emission ledger before it is handed to the consumer.
//!
//! The heuristic term of the priority is currently zero, so the order
//! degenerates to cost with a tie-break on query progress.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, debug_span};

use suggero_trie::{NodeId, Trie};

use crate::orthography::visually_similar;
use crate::settings::{settings, CostSettings};

use super::heap::{HeapKey, PairingHeap};
use super::location::{LocId, LocationCache, Suffix};
use super::{CompoundMethod, Cost, Suggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PathId(u32);

impl PathId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeId(u32);

impl EdgeId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Edit operation that produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Identity = 0,
    Replace = 1,
    Delete = 2,
    Insert = 3,
    Swap = 4,
}

/// Zero to two characters an edge appends to the parent's word.
#[derive(Debug, Clone, Copy)]
struct Label {
    chars: [char; 2],
    len: u8,
}

impl Label {
    const EMPTY: Label = Label {
        chars: ['\0', '\0'],
        len: 0,
    };

    fn one(c: char) -> Self {
        Label {
            chars: [c, '\0'],
            len: 1,
        }
    }

    fn two(a: char, b: char) -> Self {
        Label {
            chars: [a, b],
            len: 2,
        }
    }

    fn push_onto(&self, word: &mut String) {
        for k in 0..self.len as usize {
            word.push(self.chars[k]);
        }
    }
}

/// One edit path through the search space. Paths are only ever mutated to
/// track pending edges or to be deactivated when a cheaper arrival takes
/// over their location.
struct Path {
    node: NodeId,
    index: usize,
    word: String,
    g: Cost,
    f: Cost,
    active: bool,
    expanded: bool,
    from: Option<EdgeId>,
    /// Outgoing edges whose far side has not resolved yet.
    pending: u32,
}

/// Directed link from a parent path toward a location. `consumed` is a
/// cursor into the far location's suffix list, so re-notifications only
/// combine what the edge has not seen.
struct Edge {
    parent: PathId,
    label: Label,
    cost: Cost,
    action: Action,
    far: LocId,
    consumed: usize,
    resolved: bool,
}

/// Resumable suggestion generator over one trie. All caches are owned by
/// the stream and dropped with it; nothing persists across searches.
pub struct SuggestionStream<'t> {
    trie: &'t Trie,
    query: Vec<char>,
    costs: CostSettings,
    cost_limit: Cost,
    heap: PairingHeap<PathId>,
    paths: Vec<Path>,
    edges: Vec<Edge>,
    locations: LocationCache,
    resolve_queue: VecDeque<EdgeId>,
    /// Lowest cost at which each word has been queued for emission.
    emitted: HashMap<String, Cost>,
    ready: VecDeque<Suggestion>,
    pruned: u64,
    finished: bool,
}

impl<'t> SuggestionStream<'t> {
    pub fn new(
        trie: &'t Trie,
        word: &str,
        compound_method: CompoundMethod,
        ignore_case: bool,
    ) -> Self {
        let _span = debug_span!("gen_suggestions", word, ?compound_method, ignore_case).entered();
        let query: Vec<char> = word.chars().collect();
        let s = settings();
        let scaled =
            (query.len() as f64 * s.limits.max_cost_scale).min(s.limits.max_num_changes as f64);
        // all path costs are integer sums, so truncating admits the same set
        let cost_limit = (s.costs.base as f64 * scaled) as Cost;

        let mut stream = Self {
            trie,
            query,
            costs: s.costs.clone(),
            cost_limit,
            heap: PairingHeap::new(),
            paths: Vec::new(),
            edges: Vec::new(),
            locations: LocationCache::new(word.chars().count()),
            resolve_queue: VecDeque::new(),
            emitted: HashMap::new(),
            ready: VecDeque::new(),
            pruned: 0,
            finished: false,
        };
        for (k, node) in trie.initial_nodes(ignore_case).into_iter().enumerate() {
            // the exact-case trie starts at 0; every alternate is one tick
            // behind so exact-case matches win ties
            stream.seed(node, if k == 0 { 0 } else { 1 });
        }
        stream
    }

    /// Pull the next accepted word. `change_limit` is the consumer's answer
    /// to the previous yield; the stream's own bound only ever shrinks.
    pub fn next(&mut self, change_limit: Option<Cost>) -> Option<Suggestion> {
        if let Some(limit) = change_limit {
            self.cost_limit = self.cost_limit.min(limit);
        }
        loop {
            while let Some(sug) = self.ready.pop_front() {
                // the bound may have tightened, or a cheaper spelling may
                // have been queued, since this entry was pushed
                if sug.cost <= self.cost_limit
                    && self.emitted.get(&sug.word).copied() == Some(sug.cost)
                {
                    return Some(sug);
                }
                self.pruned += 1;
            }
            if !self.step() {
                return None;
            }
        }
    }

    /// Current acceptance bound, monotone non-increasing.
    pub fn cost_limit(&self) -> Cost {
        self.cost_limit
    }

    fn seed(&mut self, node: NodeId, g: Cost) {
        let loc_id = self.locations.get_or_insert(0, node);
        let pid = PathId(self.paths.len() as u32);
        self.paths.push(Path {
            node,
            index: 0,
            word: String::new(),
            g,
            f: g,
            active: true,
            expanded: false,
            from: None,
            pending: 0,
        });
        let loc = self.locations.get_mut(loc_id);
        loc.incoming.insert(String::new(), pid);
        loc.rep = Some(pid);
        let f = self.paths[pid.idx()].f;
        self.heap.push(HeapKey { f, index: 0 }, pid);
    }

    /// One frontier expansion. Returns false once the search is over and
    /// every queued resolution has been flushed.
    fn step(&mut self) -> bool {
        if self.finished {
            return false;
        }
        match self.heap.pop() {
            Some((key, pid)) if key.f <= self.cost_limit => {
                if self.paths[pid.idx()].active {
                    self.expand(pid);
                    self.drain_resolve_queue();
                }
            }
            // frontier drained, or nothing under the bound remains
            _ => {
                self.finished = true;
                self.drain_resolve_queue();
                self.log_finish();
            }
        }
        true
    }

    fn expand(&mut self, pid: PathId) {
        let trie = self.trie;
        let (node, index) = {
            let p = &mut self.paths[pid.idx()];
            p.expanded = true;
            (p.node, p.index)
        };
        let len = self.query.len();

        if trie.is_terminal(node) {
            self.add_terminal(pid, node, index);
        }

        if index == len {
            // past the end of the query only insertions apply
            for &(c, child) in trie.children(node) {
                self.add_edge(pid, child, index, Label::one(c), self.costs.base, Action::Insert);
            }
        } else {
            let qc = self.query[index];
            for &(c, child) in trie.children(node) {
                if c == qc {
                    self.add_edge(pid, child, index + 1, Label::one(c), 0, Action::Identity);
                } else {
                    let cost = if visually_similar(c, qc) {
                        self.costs.visually_similar
                    } else if index == 0 {
                        // a wrong first letter reads as a different word
                        self.costs.base + self.costs.first_letter_bias
                    } else {
                        self.costs.base
                    };
                    self.add_edge(pid, child, index + 1, Label::one(c), cost, Action::Replace);
                }
                self.add_edge(pid, child, index, Label::one(c), self.costs.base, Action::Insert);
            }
            self.add_edge(
                pid,
                node,
                index + 1,
                Label::EMPTY,
                self.costs.base,
                Action::Delete,
            );

            if index + 1 < len && self.query[index + 1] == qc {
                // doubled letter in the query collapses to one
                if let Some(child) = trie.child(node, qc) {
                    self.add_edge(
                        pid,
                        child,
                        index + 2,
                        Label::one(qc),
                        self.costs.duplicate_letter,
                        Action::Delete,
                    );
                }
            } else {
                if index + 1 < len {
                    // transpose the next two query characters
                    if let Some(via) = trie.child(node, self.query[index + 1]) {
                        if let Some(target) = trie.child(via, qc) {
                            self.add_edge(
                                pid,
                                target,
                                index + 2,
                                Label::two(self.query[index + 1], qc),
                                self.costs.swap,
                                Action::Swap,
                            );
                        }
                    }
                }
                // doubled letter in the dictionary expands from one
                if let Some(child) = trie.child(node, qc) {
                    if let Some(grand) = trie.child(child, qc) {
                        self.add_edge(
                            pid,
                            grand,
                            index + 1,
                            Label::two(qc, qc),
                            self.costs.duplicate_letter,
                            Action::Insert,
                        );
                    }
                }
            }
        }

        if self.paths[pid.idx()].pending == 0 {
            self.on_fully_resolved(pid);
        }
    }

    /// A word ends at this node: register the zero-cost empty completion at
    /// the end-of-query location and, if the query is not yet consumed,
    /// shortcut the leftover characters with a single tail-delete edge.
    fn add_terminal(&mut self, pid: PathId, node: NodeId, index: usize) {
        let len = self.query.len();
        let far = self.locations.get_or_insert(len, node);
        if !self.locations.get(far).has_trivial {
            self.locations.get_mut(far).has_trivial = true;
            self.append_suffix(
                far,
                Suffix {
                    text: String::new(),
                    cost: 0,
                },
            );
        }
        if index < len {
            let tail = (len - index) as Cost * self.costs.base;
            self.add_edge(pid, node, len, Label::EMPTY, tail, Action::Delete);
        }
    }

    /// Attach one candidate edit to `parent`. This is where the memoization
    /// happens: an arrival at a location already resolved at or below its
    /// cost combines with the known suffixes instead of spawning a path, and
    /// an arrival spelling a word a cheaper path already spelled here is
    /// dropped outright.
    fn add_edge(
        &mut self,
        parent: PathId,
        node: NodeId,
        index: usize,
        label: Label,
        cost: Cost,
        action: Action,
    ) {
        let g2 = self.paths[parent.idx()].g + cost;
        if g2 > self.cost_limit {
            self.pruned += 1;
            return;
        }
        let far = self.locations.get_or_insert(index, node);

        if matches!(self.locations.get(far).sbc, Some(sbc) if sbc <= g2) {
            self.attach_edge(parent, label, cost, action, far);
            return;
        }

        let mut word = self.paths[parent.idx()].word.clone();
        label.push_onto(&mut word);

        if let Some(&prev) = self.locations.get(far).incoming.get(&word) {
            if self.paths[prev.idx()].g <= g2 {
                self.pruned += 1;
                return;
            }
            // dethroned: the costlier arrival stops expanding, but its edge
            // keeps listening on this location
            self.paths[prev.idx()].active = false;
        }

        let eid = self.attach_edge(parent, label, cost, action, far);
        let pid = PathId(self.paths.len() as u32);
        self.paths.push(Path {
            node,
            index,
            word: word.clone(),
            g: g2,
            f: g2,
            active: true,
            expanded: false,
            from: Some(eid),
            pending: 0,
        });

        let old_rep = self.locations.get(far).rep;
        let cheaper = old_rep.map_or(true, |r| g2 < self.paths[r.idx()].g);
        if cheaper {
            if let Some(r) = old_rep {
                // tombstone in the heap; the main loop skips it on pop
                self.paths[r.idx()].active = false;
            }
        }
        let loc = self.locations.get_mut(far);
        loc.incoming.insert(word, pid);
        if cheaper {
            loc.rep = Some(pid);
            let f = self.paths[pid.idx()].f;
            self.heap.push(HeapKey { f, index }, pid);
        }
    }

    fn attach_edge(
        &mut self,
        parent: PathId,
        label: Label,
        cost: Cost,
        action: Action,
        far: LocId,
    ) -> EdgeId {
        let eid = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge {
            parent,
            label,
            cost,
            action,
            far,
            consumed: 0,
            resolved: false,
        });
        self.paths[parent.idx()].pending += 1;
        self.locations.get_mut(far).subscribers.push(eid);
        self.resolve_queue.push_back(eid);
        eid
    }

    fn append_suffix(&mut self, loc_id: LocId, suffix: Suffix) {
        self.locations.get_mut(loc_id).suffixes.push(suffix);
        // wake everyone combining through this location
        for k in 0..self.locations.get(loc_id).subscribers.len() {
            let eid = self.locations.get(loc_id).subscribers[k];
            self.resolve_queue.push_back(eid);
        }
    }

    fn drain_resolve_queue(&mut self) {
        while let Some(eid) = self.resolve_queue.pop_front() {
            self.resolve_edge(eid);
        }
    }

    /// Combine the far location's unseen suffixes into the parent: queue the
    /// completed word for emission and record the completion at the parent's
    /// own location so sibling spellings share it. A full word resurfaces at
    /// every level of the chain; the ledger collapses the replays. Once the
    /// far location is resolved the edge stops counting against its parent,
    /// which is what lets resolution cascade bottom-up.
    fn resolve_edge(&mut self, eid: EdgeId) {
        let (parent, far, label, edge_cost, consumed, was_resolved) = {
            let e = &self.edges[eid.idx()];
            (e.parent, e.far, e.label, e.cost, e.consumed, e.resolved)
        };
        let total = self.locations.get(far).suffixes.len();
        if consumed < total {
            let (pg, pindex, pnode) = {
                let p = &self.paths[parent.idx()];
                (p.g, p.index, p.node)
            };
            let parent_loc = self.locations.get_or_insert(pindex, pnode);
            for k in consumed..total {
                let Suffix { text, cost } = self.locations.get(far).suffixes[k].clone();
                let combined_cost = edge_cost + cost;
                if pg + combined_cost > self.cost_limit {
                    self.pruned += 1;
                    continue;
                }
                let mut completion = String::new();
                label.push_onto(&mut completion);
                completion.push_str(&text);

                let mut word = self.paths[parent.idx()].word.clone();
                word.push_str(&completion);
                self.queue_emission(word, pg + combined_cost);

                self.append_suffix(
                    parent_loc,
                    Suffix {
                        text: completion,
                        cost: combined_cost,
                    },
                );
            }
            self.edges[eid.idx()].consumed = total;
        }
        if !was_resolved && self.locations.get(far).sbc.is_some() {
            self.edges[eid.idx()].resolved = true;
            self.paths[parent.idx()].pending -= 1;
            if self.paths[parent.idx()].pending == 0 && self.paths[parent.idx()].expanded {
                self.on_fully_resolved(parent);
            }
        }
    }

    /// Every outgoing edge of this path has resolved. If the path represents
    /// its location, the location itself is now resolved and everyone
    /// listening on it can finish; otherwise hand what the location knows up
    /// through the parent edge.
    fn on_fully_resolved(&mut self, pid: PathId) {
        let (node, index, g, from) = {
            let p = &self.paths[pid.idx()];
            (p.node, p.index, p.g, p.from)
        };
        let loc_id = self.locations.get_or_insert(index, node);
        if self.locations.get(loc_id).rep == Some(pid) {
            let loc = self.locations.get_mut(loc_id);
            loc.sbc = Some(loc.sbc.map_or(g, |sbc| sbc.min(g)));
            for k in 0..self.locations.get(loc_id).subscribers.len() {
                let eid = self.locations.get(loc_id).subscribers[k];
                self.resolve_queue.push_back(eid);
            }
        } else if let Some(from) = from {
            self.resolve_queue.push_back(from);
        }
    }

    fn queue_emission(&mut self, word: String, cost: Cost) {
        if word.is_empty() {
            return;
        }
        if word.chars().last().is_some_and(|c| self.trie.is_no_follow(c)) {
            return;
        }
        if self.emitted.get(&word).is_some_and(|&prev| prev <= cost) {
            return;
        }
        self.emitted.insert(word.clone(), cost);
        self.ready.push_back(Suggestion { word, cost });
    }

    fn log_finish(&self) {
        let mut ops = [0u64; 5];
        for e in &self.edges {
            ops[e.action as usize] += 1;
        }
        debug!(
            emitted = self.emitted.len(),
            pruned = self.pruned,
            paths = self.paths.len(),
            locations = self.locations.len(),
            frontier = self.heap.len(),
            identity = ops[Action::Identity as usize],
            replace = ops[Action::Replace as usize],
            delete = ops[Action::Delete as usize],
            insert = ops[Action::Insert as usize],
            swap = ops[Action::Swap as usize],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suggero_trie::TrieBuilder;

    fn trie(words: &[&str]) -> Trie {
        let mut b = TrieBuilder::new();
        for w in words {
            b.insert(w);
        }
        b.build()
    }

    fn drain(stream: &mut SuggestionStream<'_>) -> Vec<Suggestion> {
        let mut out = Vec::new();
        while let Some(s) = stream.next(None) {
            out.push(s);
        }
        out
    }

    #[test]
    fn exact_match_is_free() {
        let t = trie(&["hello", "hollow"]);
        let mut stream = SuggestionStream::new(&t, "hello", CompoundMethod::None, false);
        let first = stream.next(None).unwrap();
        assert_eq!(first.word, "hello");
        assert_eq!(first.cost, 0);
    }

    #[test]
    fn empty_query_yields_nothing() {
        let t = trie(&["hello"]);
        let mut stream = SuggestionStream::new(&t, "", CompoundMethod::None, false);
        assert!(stream.next(None).is_none());
    }

    #[test]
    fn single_insertion_costs_base() {
        let t = trie(&["apple", "apples"]);
        let mut stream = SuggestionStream::new(&t, "apple", CompoundMethod::None, false);
        let all = drain(&mut stream);
        assert!(all.contains(&Suggestion {
            word: "apple".into(),
            cost: 0
        }));
        assert!(all.contains(&Suggestion {
            word: "apples".into(),
            cost: 100
        }));
    }

    #[test]
    fn tail_deletion_costs_base_per_char() {
        let t = trie(&["joy"]);
        let mut stream = SuggestionStream::new(&t, "joyxy", CompoundMethod::None, false);
        let all = drain(&mut stream);
        // two leftover characters are deleted after the terminal
        assert!(all.contains(&Suggestion {
            word: "joy".into(),
            cost: 200
        }));
    }

    #[test]
    fn no_word_is_emitted_twice() {
        let t = trie(&["cat", "cats", "cast", "coat"]);
        let mut stream = SuggestionStream::new(&t, "cat", CompoundMethod::None, false);
        let all = drain(&mut stream);
        let mut words: Vec<&str> = all.iter().map(|s| s.word.as_str()).collect();
        words.sort_unstable();
        let before = words.len();
        words.dedup();
        assert_eq!(before, words.len());
    }

    #[test]
    fn emissions_respect_initial_limit() {
        let t = trie(&["a", "ab", "abc", "abcd", "abcde", "abcdef"]);
        let query = "abq";
        let limit = (100.0 * (query.len() as f64 * 0.515).min(3.0)) as Cost;
        let mut stream = SuggestionStream::new(&t, query, CompoundMethod::None, false);
        for s in drain(&mut stream) {
            assert!(s.cost <= limit, "{s:?} exceeds {limit}");
        }
    }

    #[test]
    fn tightened_limit_is_honored_and_monotone() {
        let t = trie(&["apple", "apples", "ample"]);
        let mut stream = SuggestionStream::new(&t, "apple", CompoundMethod::None, false);
        let first = stream.next(None).unwrap();
        assert_eq!(first.cost, 0);
        let before = stream.cost_limit();
        // consumer narrows to exact matches only
        while let Some(s) = stream.next(Some(0)) {
            assert_eq!(s.cost, 0);
        }
        assert!(stream.cost_limit() <= before);
        assert_eq!(stream.cost_limit(), 0);
    }

    #[test]
    fn raising_the_limit_is_refused() {
        let t = trie(&["hello"]);
        let mut stream = SuggestionStream::new(&t, "hello", CompoundMethod::None, false);
        let initial = stream.cost_limit();
        let _ = stream.next(Some(initial * 10));
        assert_eq!(stream.cost_limit(), initial);
    }

    #[test]
    fn case_insensitive_search_reaches_folded_alternates() {
        let t = trie(&["Paris"]);
        let mut stream = SuggestionStream::new(&t, "paris", CompoundMethod::None, true);
        let all = drain(&mut stream);
        // the folded sub-trie starts one tick behind the exact-case trie
        assert!(all.contains(&Suggestion {
            word: "paris".into(),
            cost: 1
        }));
    }

    #[test]
    fn forbidden_words_never_surface() {
        let mut b = TrieBuilder::new();
        b.insert("good");
        b.insert_forbidden("goof");
        let t = b.build();
        let mut stream = SuggestionStream::new(&t, "goo", CompoundMethod::None, false);
        let all = drain(&mut stream);
        assert!(all.iter().any(|s| s.word == "good"));
        assert!(!all.iter().any(|s| s.word == "goof"));
    }
}
