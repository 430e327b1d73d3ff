//! Shared information-set tree.
//!
//! One root plus interior nodes keyed by the 64-bit packed play history.
//! Distinct deals that reach the same public history merge into the same
//! node, so the structure is a DAG over information sets rather than a tree
//! over states. All statistics are atomics and all maps are lock-protected
//! with get-or-insert semantics; node construction has no side effects, so a
//! racing insert can safely discard the losing instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use cardplay_core::Card;

/// Whose turn a node represents, relative to the seat searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The searched seat itself
    Hero,
    /// The searched seat's partner
    Partner,
    /// Either opponent
    Opponent,
}

/// One information set: leaf statistics plus outgoing action edges
pub struct Node {
    role: Role,
    edges: RwLock<FxHashMap<Card, Arc<Edge>>>,
    evals: AtomicU64,
    wins: AtomicU64,
    trick_sum: AtomicU64,
}

impl Node {
    pub(crate) fn new(role: Role) -> Self {
        Node {
            role,
            edges: RwLock::new(FxHashMap::default()),
            evals: AtomicU64::new(0),
            wins: AtomicU64::new(0),
            trick_sum: AtomicU64::new(0),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Record one playout evaluation ending at this node
    pub fn insert(&self, win: bool, tricks: u8) {
        self.evals.fetch_add(1, Ordering::Relaxed);
        self.trick_sum.fetch_add(tricks as u64, Ordering::Relaxed);
        if win {
            self.wins.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn evals(&self) -> u64 {
        self.evals.load(Ordering::Relaxed)
    }

    /// Fraction of evaluations that were wins; 0 before any evaluation
    pub fn winrate(&self) -> f64 {
        match self.evals() {
            0 => 0.0,
            n => self.wins.load(Ordering::Relaxed) as f64 / n as f64,
        }
    }

    /// Mean tricks over all evaluations; 0 before any evaluation
    pub fn avg_tricks(&self) -> f64 {
        match self.evals() {
            0 => 0.0,
            n => self.trick_sum.load(Ordering::Relaxed) as f64 / n as f64,
        }
    }

    /// Get or create the outgoing edge for a card
    pub fn edge(&self, card: Card) -> Arc<Edge> {
        if let Some(edge) = self.edges.read().get(&card) {
            return Arc::clone(edge);
        }
        let mut edges = self.edges.write();
        Arc::clone(edges.entry(card).or_insert_with(|| Arc::new(Edge::new())))
    }

    /// Snapshot of the outgoing edges
    pub fn edges(&self) -> Vec<(Card, Arc<Edge>)> {
        self.edges
            .read()
            .iter()
            .map(|(c, e)| (*c, Arc::clone(e)))
            .collect()
    }

    /// Whether the node has no outgoing edges
    pub fn is_leaf(&self) -> bool {
        self.edges.read().is_empty()
    }

    /// Observed successor nodes with visit counts, flattened across edges.
    /// Successor keys are distinct between edges because the played card is
    /// part of the key.
    pub fn children(&self) -> Vec<(u64, u64)> {
        let mut out = Vec::new();
        for (_, edge) in self.edges.read().iter() {
            out.extend(edge.successors());
        }
        out
    }

    /// Visit-frequency action distribution smoothed by `prior`:
    /// p(child) = (visits + prior) / max(total + prior * n, n)
    pub fn policy(&self, prior: f64) -> Vec<(u64, f64)> {
        let children = self.children();
        if children.is_empty() {
            return Vec::new();
        }
        let n = children.len() as f64;
        let total: u64 = children.iter().map(|(_, v)| v).sum();
        let denom = (total as f64 + prior * n).max(n);
        children
            .into_iter()
            .map(|(key, visits)| (key, (visits as f64 + prior) / denom))
            .collect()
    }
}

/// An action out of a node, with a histogram of observed successors
pub struct Edge {
    successors: Mutex<FxHashMap<u64, u64>>,
    total: AtomicU64,
}

impl Edge {
    fn new() -> Self {
        Edge {
            successors: Mutex::new(FxHashMap::default()),
            total: AtomicU64::new(0),
        }
    }

    /// Count one traversal into the successor identified by `child_key`
    pub fn update(&self, child_key: u64) {
        *self.successors.lock().entry(child_key).or_insert(0) += 1;
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Snapshot of (successor key, count)
    pub fn successors(&self) -> Vec<(u64, u64)> {
        self.successors
            .lock()
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect()
    }

    /// Successor distribution smoothed by `prior`:
    /// p(child) = (count + prior) / (total + prior * n).
    /// Yields nothing if the edge has no observations.
    pub fn dynamics(&self, prior: f64) -> Vec<(u64, f64)> {
        let successors = self.successors();
        if successors.is_empty() {
            return Vec::new();
        }
        let n = successors.len() as f64;
        let denom = self.total() as f64 + prior * n;
        successors
            .into_iter()
            .map(|(key, count)| (key, (count as f64 + prior) / denom))
            .collect()
    }
}

/// The shared tree: a fixed root plus key-addressed interior nodes
pub struct Tree {
    root: Arc<Node>,
    nodes: RwLock<FxHashMap<u64, Arc<Node>>>,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            root: Arc::new(Node::new(Role::Hero)),
            nodes: RwLock::new(FxHashMap::default()),
        }
    }

    /// The root node; its role is fixed as Hero
    pub fn root(&self) -> Arc<Node> {
        Arc::clone(&self.root)
    }

    /// Look up or insert the node for a history key. Key zero is the root.
    pub fn get_or_create(&self, key: u64, role: Role) -> Arc<Node> {
        if key == 0 {
            return self.root();
        }
        if let Some(node) = self.nodes.read().get(&key) {
            return Arc::clone(node);
        }
        let mut nodes = self.nodes.write();
        Arc::clone(nodes.entry(key).or_insert_with(|| Arc::new(Node::new(role))))
    }

    /// Look up an existing node
    pub fn get(&self, key: u64) -> Option<Arc<Node>> {
        if key == 0 {
            return Some(self.root());
        }
        self.nodes.read().get(&key).map(Arc::clone)
    }

    /// Number of interior nodes (the root not included)
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
