// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The shared resolution plan cache.
//!
//! Keyed by schema object identity, never structural equality: two
//! structurally equal schema instances are distinct keys. Entries hold only
//! [`Weak`] references to their schemas, so dropping a schema elsewhere
//! makes its entries stale; stale entries are purged on the next probe or
//! insert. Lookup and insert take a short spinlock; concurrent builders of
//! the same uncached pair each build independently and the last insert
//! wins, which is cheaper than serializing plan construction.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use crate::conversion::ConversionRegistry;
use crate::resolver::plan::ReadPlan;
use crate::schema::{Schema, SchemaRef};
use crate::util::Spinlock;

struct CacheEntry {
    writer: Weak<Schema>,
    reader: Weak<Schema>,
    // Plans bake in conversions, so a plan is only valid for the registry
    // it was built against.
    conversions: Weak<ConversionRegistry>,
    plan: Arc<ReadPlan>,
}

impl CacheEntry {
    fn matches(
        &self,
        writer: &SchemaRef,
        reader: &SchemaRef,
        conversions: &Arc<ConversionRegistry>,
    ) -> bool {
        let same = |weak: &Weak<Schema>, strong: &SchemaRef| {
            weak.upgrade().is_some_and(|s| Arc::ptr_eq(&s, strong))
        };
        same(&self.writer, writer)
            && same(&self.reader, reader)
            && self
                .conversions
                .upgrade()
                .is_some_and(|c| Arc::ptr_eq(&c, conversions))
    }

    fn alive(&self) -> bool {
        self.writer.strong_count() > 0
            && self.reader.strong_count() > 0
            && self.conversions.strong_count() > 0
    }
}

/// A concurrent map from (writer identity, reader identity) to a built plan.
#[derive(Default)]
pub struct PlanCache {
    entries: Spinlock<HashMap<(usize, usize), CacheEntry>>,
}

impl PlanCache {
    pub fn new() -> PlanCache {
        PlanCache {
            entries: Spinlock::new(HashMap::new()),
        }
    }

    /// The process-wide cache shared by all readers.
    pub fn global() -> &'static PlanCache {
        static CACHE: OnceLock<PlanCache> = OnceLock::new();
        CACHE.get_or_init(PlanCache::new)
    }

    fn key(writer: &SchemaRef, reader: &SchemaRef) -> (usize, usize) {
        (
            Arc::as_ptr(writer) as usize,
            Arc::as_ptr(reader) as usize,
        )
    }

    /// Returns the cached plan for this exact (writer, reader, registry)
    /// triple. A key collision from a reused allocation address is detected
    /// by the weak upgrade and treated as a miss.
    pub fn get(
        &self,
        writer: &SchemaRef,
        reader: &SchemaRef,
        conversions: &Arc<ConversionRegistry>,
    ) -> Option<Arc<ReadPlan>> {
        let key = Self::key(writer, reader);
        let mut entries = self.entries.lock();
        match entries.get(&key) {
            Some(entry) if entry.matches(writer, reader, conversions) => Some(entry.plan.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Inserts a plan, last write wins. Dead entries are swept here so the
    /// map cannot grow without bound as schemas come and go.
    pub fn insert(
        &self,
        writer: &SchemaRef,
        reader: &SchemaRef,
        conversions: &Arc<ConversionRegistry>,
        plan: Arc<ReadPlan>,
    ) {
        let key = Self::key(writer, reader);
        let entry = CacheEntry {
            writer: Arc::downgrade(writer),
            reader: Arc::downgrade(reader),
            conversions: Arc::downgrade(conversions),
            plan,
        };
        let mut entries = self.entries.lock();
        entries.retain(|_, e| e.alive());
        entries.insert(key, entry);
    }

    /// Number of live entries. Stale entries still awaiting a sweep count.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
