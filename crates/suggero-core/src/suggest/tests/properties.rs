//! Property tests for the edit-operation cost model.

use proptest::prelude::*;

use crate::settings::settings;
use crate::suggest::{suggest, SuggestOptions};

use super::testutil::{test_trie, WORDS};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn substituted_word_is_recovered(
        word_idx in 0..WORDS.len(),
        pos_seed: usize,
        sub in proptest::char::range('a', 'z'),
    ) {
        let word = WORDS[word_idx];
        let chars: Vec<char> = word.chars().collect();
        let pos = pos_seed % chars.len();
        prop_assume!(chars[pos] != sub);

        let mut mutated = chars.clone();
        mutated[pos] = sub;
        let query: String = mutated.iter().collect();

        let trie = test_trie();
        let results = suggest(&[&trie], &query, SuggestOptions::default()).unwrap();
        let costs = &settings().costs;
        let bound = if pos == 0 {
            costs.base + costs.first_letter_bias
        } else {
            costs.base
        };
        prop_assert!(
            results.iter().any(|s| s.word == word && s.cost <= bound),
            "{} not recovered from {} within {}",
            word,
            query,
            bound,
        );
    }

    #[test]
    fn transposed_word_is_recovered(word_idx in 0..WORDS.len(), pos_seed: usize) {
        let word = WORDS[word_idx];
        let chars: Vec<char> = word.chars().collect();
        let pos = pos_seed % (chars.len() - 1);
        prop_assume!(chars[pos] != chars[pos + 1]);

        let mut mutated = chars.clone();
        mutated.swap(pos, pos + 1);
        let query: String = mutated.iter().collect();

        let trie = test_trie();
        let results = suggest(&[&trie], &query, SuggestOptions::default()).unwrap();
        let swap = settings().costs.swap;
        prop_assert!(
            results.iter().any(|s| s.word == word && s.cost <= swap),
            "{} not recovered from {} within {}",
            word,
            query,
            swap,
        );
    }

    #[test]
    fn output_is_sorted_and_unique(query in "[a-z]{0,8}") {
        let trie = test_trie();
        let results = suggest(&[&trie], &query, SuggestOptions::default()).unwrap();
        for pair in results.windows(2) {
            prop_assert!(pair[0].cost <= pair[1].cost);
        }
        let mut words: Vec<&str> = results.iter().map(|s| s.word.as_str()).collect();
        words.sort_unstable();
        let before = words.len();
        words.dedup();
        prop_assert_eq!(before, words.len());
    }

    #[test]
    fn costs_stay_under_the_initial_limit(query in "[a-z]{1,8}") {
        let trie = test_trie();
        let s = settings();
        let scaled = (query.chars().count() as f64 * s.limits.max_cost_scale)
            .min(s.limits.max_num_changes as f64);
        let limit = (s.costs.base as f64 * scaled) as u32;
        let results = suggest(&[&trie], &query, SuggestOptions::default()).unwrap();
        prop_assert!(results.iter().all(|r| r.cost <= limit));
    }
}
