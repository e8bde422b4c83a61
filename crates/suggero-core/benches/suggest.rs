use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use suggero_core::{suggest, SuggestOptions};
use suggero_trie::{Trie, TrieBuilder};

const WORDS: &[&str] = &[
    "about", "above", "accept", "account", "across", "action", "address", "almost", "already",
    "although", "always", "amount", "another", "answer", "anything", "balance", "banana",
    "because", "become", "before", "believe", "between", "business", "category", "certain",
    "change", "company", "consider", "continue", "country", "course", "decide", "develop",
    "different", "difficult", "during", "enough", "example", "experience", "explain", "family",
    "follow", "friend", "general", "government", "happen", "history", "hello", "implode",
    "important", "include", "increase", "interest", "joyful", "language", "letter", "little",
    "member", "message", "minute", "moment", "morning", "mother", "nothing", "number", "people",
    "perhaps", "picture", "position", "possible", "present", "probably", "problem", "program",
    "question", "reason", "remember", "report", "result", "school", "second", "sentence",
    "service", "should", "simple", "social", "special", "student", "subject", "suggest",
    "system", "thought", "through", "together", "toward", "understand", "welcome", "without",
];

fn bench_trie() -> Trie {
    let mut builder = TrieBuilder::new();
    for word in WORDS {
        builder.insert(word);
    }
    builder.build()
}

fn bench_suggest(c: &mut Criterion) {
    let trie = bench_trie();
    let mut group = c.benchmark_group("suggest");
    for query in ["hello", "helol", "sugest", "cateogry", "balence", "xqzjvw"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, q| {
            b.iter(|| suggest(&[&trie], q, SuggestOptions::default()).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_suggest);
criterion_main!(benches);
