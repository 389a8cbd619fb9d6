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

//! Per-endpoint job membership lists.
//!
//! Each list is an immutable `Vec<JobId>` published through an [`ArcSwap`]. Readers load the
//! current list without locking; writers build a new list and swap it in atomically, so a
//! reader sees a job either linked or unlinked, never in between.

use crate::job::JobId;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Role an endpoint plays in a job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Role {
    Source,
    Destination,
}

pub(crate) struct EndpointIndex {
    as_source: ArcSwap<Vec<JobId>>,
    as_destination: ArcSwap<Vec<JobId>>,
}

impl EndpointIndex {
    pub(crate) fn new() -> Self {
        Self {
            as_source: ArcSwap::from_pointee(Vec::new()),
            as_destination: ArcSwap::from_pointee(Vec::new()),
        }
    }

    fn list(&self, role: Role) -> &ArcSwap<Vec<JobId>> {
        match role {
            Role::Source => &self.as_source,
            Role::Destination => &self.as_destination,
        }
    }

    /// Links `job_id` at the head of the list for `role`.
    pub(crate) fn add_membership(&self, job_id: JobId, role: Role) {
        self.list(role).rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(job_id);
            next.extend(current.iter().copied());
            next
        });
    }

    /// Unlinks `job_id` from whichever list holds it. Returns `false` if neither did.
    pub(crate) fn remove_membership(&self, job_id: JobId) -> bool {
        Self::remove_from(&self.as_source, job_id) || Self::remove_from(&self.as_destination, job_id)
    }

    fn remove_from(list: &ArcSwap<Vec<JobId>>, job_id: JobId) -> bool {
        if !list.load().contains(&job_id) {
            return false;
        }
        list.rcu(|current| {
            current
                .iter()
                .copied()
                .filter(|id| *id != job_id)
                .collect::<Vec<_>>()
        });
        true
    }

    pub(crate) fn source_jobs(&self) -> Arc<Vec<JobId>> {
        self.as_source.load_full()
    }

    pub(crate) fn destination_jobs(&self) -> Arc<Vec<JobId>> {
        self.as_destination.load_full()
    }

    /// Every job referencing this endpoint, source list first.
    pub(crate) fn all_jobs(&self) -> Vec<JobId> {
        let mut all = self.source_jobs().to_vec();
        all.extend(self.destination_jobs().iter().copied());
        all
    }
}
