//! Ranked result buffer that feeds a shrinking cost bound back to the search.
//!
//! The collector consumes `(word, cost)` pairs and answers each one with the
//! bound the generator should honor from then on: the per-word change budget
//! at first, then the worst kept cost once the buffer fills, so the search
//! can prune everything that could no longer make the cut.

use tracing::debug;

use crate::settings::settings;

use super::search::SuggestionStream;
use super::{Cost, SuggestOptions, Suggestion, SuggestionFilter};

pub struct SuggestionCollector {
    query: String,
    num_suggestions: usize,
    include_ties: bool,
    ignore_case: bool,
    filter: Option<SuggestionFilter>,
    /// Current acceptance bound; monotone non-increasing.
    max_cost: Cost,
    /// Kept candidates, sorted ascending by cost; ties keep discovery order.
    sugs: Vec<Suggestion>,
}

impl SuggestionCollector {
    pub(crate) fn new(query: &str, options: SuggestOptions) -> Self {
        Self {
            query: query.to_string(),
            num_suggestions: options.num_suggestions,
            include_ties: options.include_ties,
            ignore_case: options.ignore_case,
            filter: options.filter,
            max_cost: options.num_changes * settings().costs.base,
            sugs: Vec::new(),
        }
    }

    /// Drive a stream to exhaustion, handing the tightened bound back on
    /// every pull.
    pub fn collect(&mut self, stream: &mut SuggestionStream<'_>) {
        let mut limit = None;
        while let Some(sug) = stream.next(limit) {
            limit = Some(self.add(sug));
        }
    }

    /// Offer one candidate. Returns the bound the generator should honor
    /// from now on.
    pub fn add(&mut self, sug: Suggestion) -> Cost {
        if sug.cost <= self.max_cost && self.accepts(&sug) {
            self.insert(sug);
            self.enforce_bounds();
        }
        self.max_cost
    }

    pub fn current_limit(&self) -> Cost {
        self.max_cost
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn len(&self) -> usize {
        self.sugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sugs.is_empty()
    }

    pub fn into_suggestions(self) -> Vec<Suggestion> {
        debug!(query = %self.query, kept = self.sugs.len());
        self.sugs
    }

    fn accepts(&self, sug: &Suggestion) -> bool {
        match &self.filter {
            Some(filter) => filter(&sug.word, sug.cost),
            None => true,
        }
    }

    fn key(&self, word: &str) -> String {
        if self.ignore_case {
            word.to_lowercase()
        } else {
            word.to_string()
        }
    }

    fn insert(&mut self, sug: Suggestion) {
        let key = self.key(&sug.word);
        if let Some(pos) = self.sugs.iter().position(|s| self.key(&s.word) == key) {
            if self.sugs[pos].cost <= sug.cost {
                // the variant we already hold was seen at least as cheap
                return;
            }
            self.sugs.remove(pos);
        }
        let at = self.sugs.partition_point(|s| s.cost <= sug.cost);
        self.sugs.insert(at, sug);
    }

    fn enforce_bounds(&mut self) {
        let n = self.num_suggestions;
        if self.sugs.len() < n {
            return;
        }
        if self.include_ties {
            // keep everything tied with the Nth best
            let nth = self.sugs[n - 1].cost;
            let cut = self.sugs.partition_point(|s| s.cost <= nth);
            self.sugs.truncate(cut);
            self.max_cost = self.max_cost.min(nth);
        } else {
            self.sugs.truncate(n);
            self.max_cost = self.max_cost.min(self.sugs[n - 1].cost);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sug(word: &str, cost: Cost) -> Suggestion {
        Suggestion {
            word: word.into(),
            cost,
        }
    }

    fn collector(options: SuggestOptions) -> SuggestionCollector {
        SuggestionCollector::new("query", options)
    }

    #[test]
    fn initial_limit_is_change_budget_times_base() {
        let c = collector(SuggestOptions {
            num_changes: 5,
            ..Default::default()
        });
        assert_eq!(c.current_limit(), 500);
    }

    #[test]
    fn rejects_over_limit() {
        let mut c = collector(SuggestOptions {
            num_changes: 1,
            ..Default::default()
        });
        c.add(sug("far", 101));
        assert!(c.is_empty());
    }

    #[test]
    fn keeps_results_sorted_by_cost() {
        let mut c = collector(SuggestOptions::default());
        c.add(sug("b", 200));
        c.add(sug("a", 100));
        c.add(sug("c", 300));
        let out = c.into_suggestions();
        let costs: Vec<Cost> = out.iter().map(|s| s.cost).collect();
        assert_eq!(costs, vec![100, 200, 300]);
    }

    #[test]
    fn duplicate_word_keeps_cheapest() {
        let mut c = collector(SuggestOptions::default());
        c.add(sug("word", 200));
        c.add(sug("word", 100));
        c.add(sug("word", 300));
        let out = c.into_suggestions();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].cost, 100);
    }

    #[test]
    fn full_buffer_tightens_the_bound() {
        let mut c = collector(SuggestOptions {
            num_suggestions: 2,
            num_changes: 5,
            ..Default::default()
        });
        assert_eq!(c.add(sug("a", 100)), 500);
        // buffer full: the worst kept cost becomes the bound
        assert_eq!(c.add(sug("b", 300)), 300);
        assert_eq!(c.add(sug("c", 150)), 150);
        let out = c.into_suggestions();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].word, "c");
    }

    #[test]
    fn without_ties_output_is_capped() {
        let mut c = collector(SuggestOptions {
            num_suggestions: 2,
            ..Default::default()
        });
        c.add(sug("a", 100));
        c.add(sug("b", 100));
        c.add(sug("c", 100));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn with_ties_everything_at_nth_cost_is_kept() {
        let mut c = collector(SuggestOptions {
            num_suggestions: 2,
            include_ties: true,
            ..Default::default()
        });
        c.add(sug("a", 100));
        c.add(sug("b", 100));
        c.add(sug("c", 100));
        c.add(sug("d", 200));
        assert_eq!(c.len(), 3);
        assert!(c.into_suggestions().iter().all(|s| s.cost == 100));
    }

    #[test]
    fn ignore_case_prefers_cased_variant_at_lowest_cost() {
        let mut c = collector(SuggestOptions {
            ignore_case: true,
            ..Default::default()
        });
        c.add(sug("Apple", 100));
        c.add(sug("apple", 100));
        assert_eq!(c.len(), 1);
        assert_eq!(c.query(), "query");
        let out = c.into_suggestions();
        assert_eq!(out[0].word, "Apple");

        let mut c = collector(SuggestOptions {
            ignore_case: true,
            ..Default::default()
        });
        c.add(sug("Apple", 100));
        c.add(sug("apple", 50));
        let out = c.into_suggestions();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].word, "apple");
        assert_eq!(out[0].cost, 50);
    }

    #[test]
    fn filter_drops_candidates_before_insertion() {
        let mut c = collector(SuggestOptions {
            filter: Some(Box::new(|word, _| word != "skip")),
            ..Default::default()
        });
        c.add(sug("skip", 100));
        c.add(sug("keep", 100));
        let out = c.into_suggestions();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].word, "keep");
    }
}
