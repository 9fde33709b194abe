// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory artifact cache keyed by activity ID.
//!
//! Runs are ordered by when they started, not when they finished: each run
//! takes a sequence number up front and may only replace an entry written by
//! a run that started earlier. Nothing here is persisted: entries live until
//! the process exits, or until a capacity limit evicts the entry written by
//! the earliest-started run.

use crate::models::MemeArtifact;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Permission for one run to write its result.
#[derive(Debug)]
pub struct RunTicket {
    activity_id: u64,
    seq: u64,
}

impl RunTicket {
    pub fn activity_id(&self) -> u64 {
        self.activity_id
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Clone)]
struct CachedArtifact {
    seq: u64,
    artifact: Arc<MemeArtifact>,
}

/// Shared artifact cache; clones share the same entries.
#[derive(Clone, Default)]
pub struct ArtifactCache {
    entries: Arc<DashMap<u64, CachedArtifact>>,
    next_seq: Arc<AtomicU64>,
    capacity: Option<usize>,
}

impl ArtifactCache {
    /// Unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` activities (minimum one).
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    /// Start a run for an activity.
    pub fn begin(&self, activity_id: u64) -> RunTicket {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        RunTicket { activity_id, seq }
    }

    /// Store a run's artifact unless a later-started run already stored one.
    ///
    /// Returns whether the artifact was stored.
    pub fn commit(&self, ticket: &RunTicket, artifact: Arc<MemeArtifact>) -> bool {
        let cached = CachedArtifact {
            seq: ticket.seq,
            artifact,
        };

        match self.entries.entry(ticket.activity_id) {
            Entry::Occupied(mut entry) => {
                if entry.get().seq > ticket.seq {
                    return false;
                }
                entry.insert(cached);
            }
            Entry::Vacant(entry) => {
                entry.insert(cached);
            }
        }
        // Entry guard is released; safe to scan the map
        self.evict_over_capacity(ticket.activity_id);
        true
    }

    /// Drop entries from the earliest-started runs until within capacity.
    /// The entry just written is never the one evicted.
    fn evict_over_capacity(&self, keep: u64) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.entries.len() > capacity {
            let oldest = self
                .entries
                .iter()
                .filter(|entry| *entry.key() != keep)
                .min_by_key(|entry| entry.seq)
                .map(|entry| (*entry.key(), entry.seq));
            let Some((activity_id, seq)) = oldest else {
                return;
            };
            if self
                .entries
                .remove_if(&activity_id, |_, cached| cached.seq == seq)
                .is_some()
            {
                tracing::debug!(activity_id, "Evicted cached meme");
            }
        }
    }

    pub fn get(&self, activity_id: u64) -> Option<Arc<MemeArtifact>> {
        self.entries
            .get(&activity_id)
            .map(|entry| entry.artifact.clone())
    }

    pub fn contains(&self, activity_id: u64) -> bool {
        self.entries.contains_key(&activity_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
