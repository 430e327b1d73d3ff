//! Information-set Monte Carlo analysis of bridge card play.
//!
//! The engine samples full deals consistent with the visible position
//! (determinization), runs short random playouts from each sample through a
//! shared tree keyed by public play history, scores playout leaves with a
//! double-dummy oracle, and finally backs the tree up under configurable
//! opponent and partner models to value each candidate move.

mod backup;
mod engine;
mod sampler;
mod tree;
mod world;

pub use backup::{
    score, Adversarial, BackupEvaluator, ChildValue, Expectation, LinearBlend, Model, Optimistic,
    SoftMax, SoftMin,
};
pub use engine::{Engine, SearchConfig, SearchProgress};
pub use sampler::Sampler;
pub use tree::{Edge, Node, Role, Tree};
pub use world::World;
