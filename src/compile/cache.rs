//! Compile cache keyed by a fingerprint of the input segment set
//!
//! Compilation is cheap string-building relative to the solver round trip,
//! so the cache is an optional accelerator, not a correctness requirement.
//! Entries are keyed by an `FxHasher` hash of the fully hydrated segments,
//! so any edit to a segment, rule, condition, or referenced attribute
//! produces a fresh entry.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHasher;

use super::ConstraintCompiler;
use crate::model::Segment;
use crate::Result;

/// Lock-free cache of rendered constraint documents.
///
/// Entries keep the segment set they were compiled from; a hit requires the
/// stored segments to equal the requested ones, so a fingerprint collision
/// degrades to a recompile instead of returning the wrong document.
#[derive(Debug, Default)]
pub struct CompileCache {
    entries: DashMap<u64, CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    segments: Vec<Segment>,
    text: Arc<str>,
}

impl CompileCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all cached documents.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Render the constraint document for `segments`, reusing a cached
    /// rendering when the exact same hydrated segment set was compiled
    /// before.
    ///
    /// # Errors
    ///
    /// Propagates compilation errors; failures are never cached.
    pub fn render_cached(
        &self,
        compiler: &ConstraintCompiler,
        segments: &[Segment],
    ) -> Result<Arc<str>> {
        let key = fingerprint(segments);
        if let Some(entry) = self.entries.get(&key) {
            if entry.segments.as_slice() == segments {
                return Ok(Arc::clone(&entry.text));
            }
        }
        let text: Arc<str> = compiler.compile(segments)?.render().into();
        self.entries.insert(
            key,
            CacheEntry {
                segments: segments.to_vec(),
                text: Arc::clone(&text),
            },
        );
        Ok(text)
    }
}

fn fingerprint(segments: &[Segment]) -> u64 {
    let mut hasher = FxHasher::default();
    segments.hash(&mut hasher);
    hasher.finish()
}
