//! Spell-suggestion core.
//!
//! Given a query string and one or more word tries, produce a ranked list of
//! correction candidates minimizing an edit-distance-like cost. The search is
//! a best-first exploration of the joint (query position × trie node) space
//! with node-level memoization, so alternative misspelling paths share the
//! cost of common dictionary suffixes.

pub mod orthography;
pub mod settings;
pub mod suggest;

pub use suggest::{
    gen_suggestions, suggest, suggestion_collector, CompoundMethod, Cost, SuggestError,
    SuggestOptions, Suggestion, SuggestionCollector, SuggestionStream,
};
