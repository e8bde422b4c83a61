use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use suggero_core::{suggest, SuggestOptions};
use suggero_trie::{Trie, TrieBuilder};

#[derive(Parser)]
#[command(name = "suggero", about = "Spelling suggestions from a word list")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Suggest corrections for a word
    Suggest {
        /// Word list file (one word per line, `!` prefix marks forbidden words)
        #[arg(long, short = 'd')]
        dict: PathBuf,
        /// Word to correct
        word: String,
        /// Number of suggestions
        #[arg(short, long, default_value = "10")]
        num_suggestions: usize,
        /// Change budget per word, in whole edits
        #[arg(long, default_value = "5")]
        num_changes: u32,
        /// Keep every suggestion tied with the last kept one
        #[arg(long)]
        include_ties: bool,
        /// Match case/accent-folded alternates too
        #[arg(long)]
        ignore_case: bool,
    },
    /// Check whether words are in the list
    Check {
        /// Word list file
        #[arg(long, short = 'd')]
        dict: PathBuf,
        /// Words to check
        words: Vec<String>,
    },
    /// Show word-list statistics
    Info {
        /// Word list file
        #[arg(long, short = 'd')]
        dict: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Suggest {
            dict,
            word,
            num_suggestions,
            num_changes,
            include_ties,
            ignore_case,
        } => {
            let trie = load_word_list(&dict)?;
            let options = SuggestOptions {
                num_suggestions,
                num_changes,
                include_ties,
                ignore_case,
                ..Default::default()
            };
            let results = suggest(&[&trie], &word, options)?;
            if results.is_empty() {
                eprintln!("no suggestions for {word:?}");
            }
            for s in results {
                println!("{}\t{}", s.word, s.cost);
            }
        }
        Command::Check { dict, words } => {
            let trie = load_word_list(&dict)?;
            for word in words {
                let verdict = if trie.is_forbidden(&word) {
                    "forbidden"
                } else if trie.contains(&word) || trie.contains_folded(&word) {
                    "ok"
                } else {
                    "unknown"
                };
                println!("{word}\t{verdict}");
            }
        }
        Command::Info { dict } => {
            let trie = load_word_list(&dict)?;
            println!("words\t{}", trie.word_count());
            println!("nodes\t{}", trie.node_count());
        }
    }
    Ok(())
}

/// Build a trie from a plain word list: one word per line, blank lines and
/// `#` comments skipped, a `!` prefix marks a forbidden word.
fn load_word_list(path: &Path) -> anyhow::Result<Trie> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading word list {}", path.display()))?;
    let mut builder = TrieBuilder::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.strip_prefix('!') {
            Some(forbidden) => builder.insert_forbidden(forbidden.trim()),
            None => builder.insert(line),
        }
    }
    let trie = builder.build();
    debug!(words = trie.word_count(), nodes = trie.node_count(), "word list loaded");
    Ok(trie)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}
