//! Backup evaluation of a finished tree.
//!
//! The evaluator walks the tree from the root and assigns each root move a
//! value under a pluggable pair of models, one for the partner's nodes and
//! one for the opponents'. Extreme models (max/min) reproduce the classic
//! optimistic/paranoid backups; the probability-weighted models temper
//! strategy fusion by averaging over the observed visit distribution.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use cardplay_core::Card;

use crate::tree::{Node, Role, Tree};

const EPSILON: f64 = 1e-9;

/// Leaf value of a node from its accumulated statistics.
///
/// The winrate carries the signal; the trick ratio only breaks ties at the
/// extremes, keeping certain losses ordered by tricks and certain wins
/// strictly above every uncertain line.
pub fn score(node: &Node) -> f64 {
    let w = node.winrate();
    let r = node.avg_tricks() / 13.0;
    if w < EPSILON {
        -1e-3 * (1.0 - r)
    } else if w > 1.0 - EPSILON {
        1.0 + 1e-3 * r
    } else {
        w
    }
}

/// A successor's visit count and backed-up value
#[derive(Debug, Clone, Copy)]
pub struct ChildValue {
    pub visits: u64,
    pub score: f64,
}

/// Visit-frequency weights smoothed by `prior`, with the same denominator
/// floor as the node policy
fn policy_weights(children: &[ChildValue], prior: f64) -> Vec<f64> {
    let n = children.len() as f64;
    let total: u64 = children.iter().map(|c| c.visits).sum();
    let denom = (total as f64 + prior * n).max(n);
    children
        .iter()
        .map(|c| (c.visits as f64 + prior) / denom)
        .collect()
}

/// Backup rule applied at a partner or opponent node
pub trait Model: Send + Sync {
    fn backup(&self, role: Role, children: &[ChildValue]) -> f64;
}

/// Assume the seat always picks the best move for us
pub struct Optimistic;

impl Model for Optimistic {
    fn backup(&self, _role: Role, children: &[ChildValue]) -> f64 {
        match children.iter().map(|c| c.score).reduce(f64::max) {
            Some(v) => v,
            None => 0.0,
        }
    }
}

/// Assume the seat always picks the worst move for us
pub struct Adversarial;

impl Model for Adversarial {
    fn backup(&self, _role: Role, children: &[ChildValue]) -> f64 {
        match children.iter().map(|c| c.score).reduce(f64::min) {
            Some(v) => v,
            None => 0.0,
        }
    }
}

/// Average the children under the visit-frequency policy
pub struct Expectation {
    pub prior: f64,
}

impl Model for Expectation {
    fn backup(&self, _role: Role, children: &[ChildValue]) -> f64 {
        let weights = policy_weights(children, self.prior);
        children
            .iter()
            .zip(&weights)
            .map(|(c, p)| p * c.score)
            .sum()
    }
}

/// Blend the extreme backup with the expectation: `(1-λ)·extreme + λ·mean`.
/// The extreme is the maximum at a partner node, the minimum otherwise.
pub struct LinearBlend {
    pub lambda: f64,
    pub prior: f64,
}

impl Model for LinearBlend {
    fn backup(&self, role: Role, children: &[ChildValue]) -> f64 {
        if children.is_empty() {
            return 0.0;
        }
        let extreme = match role {
            Role::Partner => Optimistic.backup(role, children),
            _ => Adversarial.backup(role, children),
        };
        let mean = Expectation { prior: self.prior }.backup(role, children);
        (1.0 - self.lambda) * extreme + self.lambda * mean
    }
}

/// Soft maximum at temperature τ over the policy distribution, computed in
/// log-sum-exp form so huge values cannot overflow
pub struct SoftMax {
    pub tau: f64,
    pub prior: f64,
}

fn soft_extremum(children: &[ChildValue], prior: f64, tau: f64, sign: f64) -> f64 {
    if children.is_empty() {
        return 0.0;
    }
    let weights = policy_weights(children, prior);
    let shift = children
        .iter()
        .map(|c| sign * c.score / tau)
        .fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = children
        .iter()
        .zip(&weights)
        .map(|(c, p)| p * (sign * c.score / tau - shift).exp())
        .sum();
    sign * tau * (sum.ln() + shift)
}

impl Model for SoftMax {
    fn backup(&self, _role: Role, children: &[ChildValue]) -> f64 {
        soft_extremum(children, self.prior, self.tau, 1.0)
    }
}

/// Soft minimum: the symmetric transform on negated values
pub struct SoftMin {
    pub tau: f64,
    pub prior: f64,
}

impl Model for SoftMin {
    fn backup(&self, _role: Role, children: &[ChildValue]) -> f64 {
        soft_extremum(children, self.prior, self.tau, -1.0)
    }
}

/// Walks a finished tree under an (opponent, partner) model pair
pub struct BackupEvaluator<'a> {
    opponent: &'a dyn Model,
    partner: &'a dyn Model,
}

impl<'a> BackupEvaluator<'a> {
    pub fn new(opponent: &'a dyn Model, partner: &'a dyn Model) -> Self {
        BackupEvaluator { opponent, partner }
    }

    /// Value every move out of the root: the successor-histogram-weighted
    /// backup of each root edge
    pub fn evaluate(&self, tree: &Tree) -> BTreeMap<Card, f64> {
        let mut memo = FxHashMap::default();
        let mut scores = BTreeMap::new();
        for (card, edge) in tree.root().edges() {
            let mut value = 0.0;
            for (key, p) in edge.dynamics(0.0) {
                if let Some(child) = tree.get(key) {
                    value += p * self.eval_node(tree, &child, key, &mut memo);
                }
            }
            scores.insert(card, value);
        }
        scores
    }

    fn eval_node(
        &self,
        tree: &Tree,
        node: &Arc<Node>,
        key: u64,
        memo: &mut FxHashMap<u64, f64>,
    ) -> f64 {
        if let Some(v) = memo.get(&key) {
            return *v;
        }

        let children = node.children();
        let value = if children.is_empty() {
            score(node)
        } else {
            let resolved: Vec<ChildValue> = children
                .iter()
                .filter_map(|(child_key, visits)| {
                    tree.get(*child_key).map(|child| ChildValue {
                        visits: *visits,
                        score: self.eval_node(tree, &child, *child_key, memo),
                    })
                })
                .collect();
            match node.role() {
                Role::Hero => match resolved.iter().map(|c| c.score).reduce(f64::max) {
                    Some(v) => v,
                    None => score(node),
                },
                Role::Partner => self.partner.backup(Role::Partner, &resolved),
                Role::Opponent => self.opponent.backup(Role::Opponent, &resolved),
            }
        };

        memo.insert(key, value);
        value
    }
}
