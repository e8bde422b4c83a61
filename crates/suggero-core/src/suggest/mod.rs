//! Ranked spelling suggestions over one or more word tries.
//!
//! `suggest` is the orchestration entry; `SuggestionStream` is the underlying
//! generator whose `next(change_limit)` models the producer/consumer contract:
//! the consumer may hand back a tighter cost bound on every resume, and the
//! stream honors it from then on.

mod collector;
mod heap;
mod location;
mod search;

#[cfg(test)]
mod tests;

use tracing::debug_span;

use suggero_trie::Trie;

use crate::settings::settings;

pub use collector::SuggestionCollector;
pub use search::SuggestionStream;

/// Edit cost in `costs.base` units per full change.
pub type Cost = u32;

/// One correction candidate. Cost is in `costs.base` units per full change,
/// so 100 is one edit with default settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub word: String,
    pub cost: Cost,
}

/// How multi-word joins are handled during search. Only `None` is currently
/// exercised; the other variants are accepted as a forward-compatible hook
/// and search identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompoundMethod {
    #[default]
    None,
    JoinWords,
    SeparateWords,
}

#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("num_suggestions must be at least 1")]
    InvalidNumSuggestions,
    #[error("num_changes must be at least 1")]
    InvalidNumChanges,
}

/// Predicate applied before a word is kept by the collector.
pub type SuggestionFilter = Box<dyn Fn(&str, Cost) -> bool>;

pub struct SuggestOptions {
    pub num_suggestions: usize,
    /// Change budget per word, in whole edits (multiplied by `costs.base`).
    pub num_changes: u32,
    pub include_ties: bool,
    pub ignore_case: bool,
    pub compound_method: CompoundMethod,
    pub filter: Option<SuggestionFilter>,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        let results = &settings().results;
        Self {
            num_suggestions: results.num_suggestions,
            num_changes: results.num_changes,
            include_ties: false,
            ignore_case: false,
            compound_method: CompoundMethod::None,
            filter: None,
        }
    }
}

/// Suggest corrections for `word`, searching each trie in turn into one
/// shared collector, so the cost bound keeps tightening across tries and
/// duplicates collapse to their cheapest occurrence. Results are sorted by
/// ascending cost.
pub fn suggest(
    tries: &[&Trie],
    word: &str,
    options: SuggestOptions,
) -> Result<Vec<Suggestion>, SuggestError> {
    if options.num_suggestions == 0 {
        return Err(SuggestError::InvalidNumSuggestions);
    }
    if options.num_changes == 0 {
        return Err(SuggestError::InvalidNumChanges);
    }
    let _span = debug_span!("suggest", word, tries = tries.len()).entered();

    let ignore_case = options.ignore_case;
    let compound_method = options.compound_method;
    let mut collector = SuggestionCollector::new(word, options);
    for trie in tries {
        let mut stream = SuggestionStream::new(trie, word, compound_method, ignore_case);
        collector.collect(&mut stream);
    }
    Ok(collector.into_suggestions())
}

/// Low-level generator over a single trie, case-sensitive.
pub fn gen_suggestions<'t>(
    trie: &'t Trie,
    word: &str,
    compound_method: CompoundMethod,
) -> SuggestionStream<'t> {
    SuggestionStream::new(trie, word, compound_method, false)
}

/// Collector factory for callers driving `SuggestionStream` themselves.
pub fn suggestion_collector(word: &str, options: SuggestOptions) -> SuggestionCollector {
    SuggestionCollector::new(word, options)
}
