//! Visual-letter similarity masks.
//!
//! Each character maps to a bitmask with one bit per similarity group; two
//! characters are visually similar when their masks share a bit. The search
//! engine charges `costs.visually_similar` instead of `costs.base` for a
//! replacement between similar characters, which is what lets common visual
//! typos dominate the candidate set.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Characters that read as each other at a glance, one group per entry.
/// A character may sit in several groups; its mask is the OR of their bits.
const VISUAL_GROUPS: &[&str] = &[
    "aeiouy",
    "aàáâãäåāăą",
    "cçćč",
    "eèéêëēėęě",
    "iìíîïīį1l!|",
    "nñń",
    "oòóôõöøō0",
    "sśşš5$",
    "uùúûüūv",
    "yýÿ",
    "zźżž2",
    "gq9",
    "b8",
    "mn",
];

fn mask_map() -> &'static HashMap<char, u32> {
    static MAP: OnceLock<HashMap<char, u32>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for (bit, group) in VISUAL_GROUPS.iter().enumerate() {
            for c in group.chars() {
                *map.entry(c).or_insert(0) |= 1 << bit;
                for upper in c.to_uppercase() {
                    *map.entry(upper).or_insert(0) |= 1 << bit;
                }
            }
        }
        map
    })
}

/// Bitmask of the similarity groups `c` belongs to; 0 when unmapped.
pub fn visual_mask(c: char) -> u32 {
    mask_map().get(&c).copied().unwrap_or(0)
}

pub fn visually_similar(a: char, b: char) -> bool {
    visual_mask(a) & visual_mask(b) != 0
}
