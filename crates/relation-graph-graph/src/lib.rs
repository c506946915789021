//! Weighted graph model and structural analysis for relation-graph.
//!
//! This crate owns everything that looks at entities and relationships
//! *as a graph*:
//! - [`model::EntityGraph`] — the in-memory weighted graph built per
//!   discovery run
//! - [`traversal`] — bounded simple-path enumeration and shortest
//!   weighted paths
//! - [`centrality`] — degree/betweenness/closeness measures
//! - [`patterns`] — hub/community/triangle/chain/star detection with
//!   composite importance scoring
//!
//! Callers only see the operations actually used by discovery, so the
//! underlying algorithms can be swapped without touching them.

pub mod centrality;
pub mod error;
pub mod model;
pub mod patterns;
pub mod traversal;

pub use error::{GraphError, GraphResult};
pub use model::{EntityGraph, WeightMode};
pub use patterns::{DetectedPatterns, PatternRecognizer};
