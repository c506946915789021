//! Orchestrator-owned caches.
//!
//! One explicit cache object holds the path cache and the pattern cache,
//! keyed by a signature of the input entity/relationship set. Any change
//! to the inputs invalidates both; `clear()` is always available. Caches
//! are process-local and never shared across differing input sets.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use relation_graph_core::types::{Entity, Relationship};
use relation_graph_graph::DetectedPatterns;

use crate::multihop::PathCache;

/// Signature of one discovery run's inputs.
///
/// Covers entity ids/types/attributes and relationship keys/confidences,
/// so any mutation of the input set produces a different value.
pub fn input_signature(entities: &[Entity], relationships: &[Relationship]) -> u64 {
    let mut hasher = DefaultHasher::new();
    entities.len().hash(&mut hasher);
    for entity in entities {
        entity.id.hash(&mut hasher);
        entity.entity_type.hash(&mut hasher);
        for (key, value) in &entity.attributes {
            key.hash(&mut hasher);
            value.hash(&mut hasher);
        }
    }
    relationships.len().hash(&mut hasher);
    for rel in relationships {
        rel.dedup_key().hash(&mut hasher);
        rel.confidence.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Path and pattern caches with signature-based invalidation.
#[derive(Default)]
pub struct DiscoveryCache {
    signature: Mutex<Option<u64>>,
    paths: Arc<PathCache>,
    patterns: Mutex<Option<DetectedPatterns>>,
}

impl DiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared path cache.
    pub fn paths(&self) -> Arc<PathCache> {
        Arc::clone(&self.paths)
    }

    /// Invalidate everything if the inputs changed since the last run.
    pub fn ensure_current(&self, signature: u64) {
        let mut stored = self.signature.lock();
        if *stored != Some(signature) {
            debug!(signature, "Input set changed, invalidating caches");
            self.paths.clear();
            *self.patterns.lock() = None;
            *stored = Some(signature);
        }
    }

    pub fn cached_patterns(&self) -> Option<DetectedPatterns> {
        self.patterns.lock().clone()
    }

    pub fn store_patterns(&self, detected: DetectedPatterns) {
        *self.patterns.lock() = Some(detected);
    }

    /// Drop all cached state unconditionally.
    pub fn clear(&self) {
        *self.signature.lock() = None;
        self.paths.clear();
        *self.patterns.lock() = None;
    }
}
