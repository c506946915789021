//! Relationship discovery for the relation-graph system.
//!
//! Infers, scores, and synthesizes typed relationships between graph
//! entities beyond what explicit references provide.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      DISCOVERY ENGINE                          │
//! ├────────────────────────────────────────────────────────────────┤
//! │ Explicit Rules → fan-out { Multi-Hop │ Temporal │ Semantic }   │
//! │               → merge → dedup → context filter                 │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - **explicit**: declarative rules over entity attributes
//! - **multihop**: bounded path enumeration and scoring over the
//!   weighted graph
//! - **temporal**: time-series correlation, lag, and causality between
//!   entity event streams
//! - **engine**: orchestration with fan-out/fan-in, deduplication, and
//!   signature-keyed caches
//!
//! Pattern recognition lives in `relation-graph-graph` and is exposed
//! here through [`DiscoveryEngine::discover_patterns`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use relation_graph_core::{config::EngineConfig, types::{DiscoveryContext, RuleSet}};
//! use relation_graph_discovery::DiscoveryEngine;
//!
//! async fn example(entities: Vec<_>, relationships: Vec<_>, events: Vec<_>) {
//!     let engine = DiscoveryEngine::new(EngineConfig::load(), RuleSet::builtin()).unwrap();
//!     let report = engine
//!         .discover(&entities, &relationships, &events, &DiscoveryContext::default())
//!         .await
//!         .unwrap();
//!     println!("discovered {} relationships", report.relationships.len());
//! }
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod explicit;
pub mod interpret;
pub mod multihop;
pub mod semantic;
pub mod temporal;

// Re-exports
pub use cache::{input_signature, DiscoveryCache};
pub use engine::{
    deduplicate, DiscoveryEngine, DiscoveryMetrics, DiscoveryReport, TaskFailure,
};
pub use error::{DiscoveryError, DiscoveryResult};
pub use explicit::{ExplicitBuildResult, ExplicitRelationshipBuilder};
pub use interpret::{PathInterpreter, PathNarrative, RuleBasedInterpreter};
pub use multihop::{MultiHopDiscoverer, PathCache, ScoredPath};
pub use semantic::SemanticMiner;
pub use temporal::{TemporalAnalysisResult, TemporalAnalyzer};
