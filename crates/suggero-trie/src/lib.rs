//! Character prefix tree with reserved root markers.
//!
//! Nodes live in a flat arena and are addressed by `NodeId`, so the tree is
//! immutable and cheap to traverse once built. A root declares three reserved
//! single-character markers: words stored under the forbidden marker are known
//! but never suggested, and case/accent-folded alternates live under the strip
//! marker as a parallel sub-trie. The suggestion engine never matches on the
//! marker characters themselves; it only consults the root-declared fields.

/// Handle into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The true root of the trie (marker children included).
    pub const ROOT: NodeId = NodeId(0);

    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Reserved single-character markers declared by a trie root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieInfo {
    /// Joins word parts in compound entries.
    pub compound_character: char,
    /// Words stored under this child are known-bad and must never be emitted.
    pub forbidden_word_prefix: char,
    /// Case/accent-folded alternates live under this child.
    pub strip_case_and_accents_prefix: char,
}

impl Default for TrieInfo {
    fn default() -> Self {
        Self {
            compound_character: '+',
            forbidden_word_prefix: '!',
            strip_case_and_accents_prefix: '~',
        }
    }
}

impl TrieInfo {
    pub fn markers(&self) -> [char; 3] {
        [
            self.compound_character,
            self.forbidden_word_prefix,
            self.strip_case_and_accents_prefix,
        ]
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    /// Sorted by character so lookup is a binary search.
    children: Vec<(char, NodeId)>,
    terminal: bool,
}

/// Mutable trie under construction. `build` freezes it into a [`Trie`].
pub struct TrieBuilder {
    nodes: Vec<Node>,
    info: TrieInfo,
    fold_alternates: bool,
    word_count: usize,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self::with_info(TrieInfo::default())
    }

    pub fn with_info(info: TrieInfo) -> Self {
        Self {
            nodes: vec![Node::default()],
            info,
            fold_alternates: true,
            word_count: 0,
        }
    }

    /// Whether folded alternates are stored under the strip marker when
    /// folding changes the word. On by default; case-insensitive search
    /// only finds cased entries through these alternates.
    pub fn fold_alternates(mut self, yes: bool) -> Self {
        self.fold_alternates = yes;
        self
    }

    pub fn insert(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        self.insert_from(NodeId::ROOT, word);
        self.word_count += 1;
        if self.fold_alternates {
            let folded = fold_word(word);
            if folded != word {
                let strip = self.child_or_insert(
                    NodeId::ROOT,
                    self.info.strip_case_and_accents_prefix,
                );
                self.insert_from(strip, &folded);
            }
        }
    }

    /// Store a known-bad word under the forbidden marker.
    pub fn insert_forbidden(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let forbidden = self.child_or_insert(NodeId::ROOT, self.info.forbidden_word_prefix);
        self.insert_from(forbidden, word);
    }

    fn insert_from(&mut self, from: NodeId, word: &str) {
        let mut at = from;
        for c in word.chars() {
            at = self.child_or_insert(at, c);
        }
        self.nodes[at.idx()].terminal = true;
    }

    fn child_or_insert(&mut self, node: NodeId, c: char) -> NodeId {
        match self.nodes[node.idx()]
            .children
            .binary_search_by_key(&c, |&(ch, _)| ch)
        {
            Ok(pos) => self.nodes[node.idx()].children[pos].1,
            Err(pos) => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(Node::default());
                self.nodes[node.idx()].children.insert(pos, (c, id));
                id
            }
        }
    }

    /// Freeze the builder. This also materializes the synthetic suggest
    /// root: the true root's children minus the marker edges, which is the
    /// entry point the search engine starts from.
    pub fn build(mut self) -> Trie {
        let markers = self.info.markers();
        let children: Vec<(char, NodeId)> = self.nodes[NodeId::ROOT.idx()]
            .children
            .iter()
            .copied()
            .filter(|&(c, _)| !markers.contains(&c))
            .collect();
        let suggest_root = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            children,
            terminal: false,
        });
        let case_root = lookup_child(
            &self.nodes,
            NodeId::ROOT,
            self.info.strip_case_and_accents_prefix,
        );
        Trie {
            nodes: self.nodes,
            info: self.info,
            suggest_root,
            case_root,
            word_count: self.word_count,
        }
    }
}

fn lookup_child(nodes: &[Node], node: NodeId, c: char) -> Option<NodeId> {
    let children = &nodes[node.idx()].children;
    children
        .binary_search_by_key(&c, |&(ch, _)| ch)
        .ok()
        .map(|pos| children[pos].1)
}

/// Immutable prefix tree.
pub struct Trie {
    nodes: Vec<Node>,
    info: TrieInfo,
    suggest_root: NodeId,
    case_root: Option<NodeId>,
    word_count: usize,
}

impl Trie {
    pub fn info(&self) -> &TrieInfo {
        &self.info
    }

    pub fn child(&self, node: NodeId, c: char) -> Option<NodeId> {
        lookup_child(&self.nodes, node, c)
    }

    pub fn children(&self, node: NodeId) -> &[(char, NodeId)] {
        &self.nodes[node.idx()].children
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.nodes[node.idx()].terminal
    }

    /// Entry points for a suggestion search: the marker-free suggest root,
    /// plus the folded sub-trie root when case-insensitive search is
    /// requested and folded alternates exist.
    pub fn initial_nodes(&self, ignore_case: bool) -> Vec<NodeId> {
        let mut nodes = vec![self.suggest_root];
        if ignore_case {
            if let Some(case_root) = self.case_root {
                nodes.push(case_root);
            }
        }
        nodes
    }

    /// Characters a suggested word must not end in.
    pub fn is_no_follow(&self, c: char) -> bool {
        self.info.markers().contains(&c)
    }

    fn walk(&self, from: NodeId, word: &str) -> Option<NodeId> {
        let mut at = from;
        for c in word.chars() {
            at = self.child(at, c)?;
        }
        Some(at)
    }

    pub fn contains(&self, word: &str) -> bool {
        !word.is_empty()
            && self
                .walk(NodeId::ROOT, word)
                .is_some_and(|n| self.is_terminal(n))
    }

    /// Exact match against the folded sub-trie; `word` is folded first.
    pub fn contains_folded(&self, word: &str) -> bool {
        let Some(case_root) = self.case_root else {
            return false;
        };
        self.walk(case_root, &fold_word(word))
            .is_some_and(|n| self.is_terminal(n))
    }

    pub fn is_forbidden(&self, word: &str) -> bool {
        self.child(NodeId::ROOT, self.info.forbidden_word_prefix)
            .and_then(|f| self.walk(f, word))
            .is_some_and(|n| self.is_terminal(n))
    }

    /// Number of words inserted (folded alternates and forbidden entries
    /// not counted).
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Lowercase a word and strip common Latin diacritics.
pub fn fold_word(word: &str) -> String {
    word.chars()
        .flat_map(char::to_lowercase)
        .map(strip_accent)
        .collect()
}

fn strip_accent(c: char) -> char {
    match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ì'..='ï' | 'ī' | 'į' => 'i',
        'ñ' | 'ń' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ś' | 'ş' | 'š' => 's',
        'ù'..='ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        'ď' | 'đ' => 'd',
        'ğ' => 'g',
        'ł' => 'l',
        'ř' => 'r',
        'ť' => 't',
        _ => c,
    }
}
