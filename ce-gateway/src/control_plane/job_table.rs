/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Job-table storage owner for live routing jobs.
//!
//! The table is a copy-on-write `BTreeMap` behind an [`ArcSwap`]. Lookups and scans load the
//! current map without locking and keep it alive for as long as they hold it; writers
//! publish a new map with one atomic swap. A removed job is freed when the last reader
//! holding a map (or the job itself) lets go of it.

use crate::job::{JobId, JobSnapshot, RoutingJob, ALL_JOBS};
use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

type JobMap = BTreeMap<JobId, Arc<RoutingJob>>;

pub(crate) struct JobTable {
    jobs: ArcSwap<JobMap>,
    next_id: AtomicU32,
}

impl JobTable {
    pub(crate) fn new() -> Self {
        Self {
            jobs: ArcSwap::from_pointee(BTreeMap::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Hands out the next job id. Ids start at 1 and are never reused.
    pub(crate) fn allocate_id(&self) -> JobId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn insert(&self, job: Arc<RoutingJob>) {
        self.jobs.rcu(|current| {
            let mut next = JobMap::clone(current);
            next.insert(job.id, job.clone());
            next
        });
    }

    /// Unlinks `job_id` and hands the job back to the caller.
    pub(crate) fn remove(&self, job_id: JobId) -> Option<Arc<RoutingJob>> {
        let removed = self.jobs.load().get(&job_id).cloned()?;
        self.jobs.rcu(|current| {
            let mut next = JobMap::clone(current);
            next.remove(&job_id);
            next
        });
        Some(removed)
    }

    pub(crate) fn get(&self, job_id: JobId) -> Option<Arc<RoutingJob>> {
        self.jobs.load().get(&job_id).cloned()
    }

    pub(crate) fn ids(&self) -> Vec<JobId> {
        self.jobs.load().keys().copied().collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.jobs.load().len()
    }

    /// Pins the current table for listing. `filter_id == 0` selects every job.
    pub(crate) fn listing(&self, filter_id: JobId) -> RouteListing {
        RouteListing {
            jobs: self.jobs.load_full(),
            filter_id,
        }
    }
}

/// Restartable listing over the jobs live when it was taken.
///
/// Snapshots are built lazily while iterating, so counters reflect the moment each entry is
/// read. Jobs removed after the listing was taken still appear in it; jobs added after it
/// do not.
#[derive(Clone)]
pub struct RouteListing {
    jobs: Arc<JobMap>,
    filter_id: JobId,
}

impl RouteListing {
    pub fn iter(&self) -> impl Iterator<Item = JobSnapshot> + '_ {
        let filter_id = self.filter_id;
        self.jobs
            .values()
            .filter(move |job| filter_id == ALL_JOBS || job.id == filter_id)
            .map(|job| job.snapshot())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for &'a RouteListing {
    type Item = JobSnapshot;
    type IntoIter = Box<dyn Iterator<Item = JobSnapshot> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
