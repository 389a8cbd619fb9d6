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

//! In-crate transport doubles for unit tests.

use crate::error::TransportError;
use crate::frame::read_can_id;
use crate::job::CanFilter;
use crate::transport::{CanFrameListener, CanTransport, NetStack};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type Registration = (CanFilter, Arc<dyn CanFrameListener>);

fn same_listener(a: &Arc<dyn CanFrameListener>, b: &Arc<dyn CanFrameListener>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

#[derive(Default)]
pub(crate) struct RecordingCanTransport {
    registrations: Mutex<Vec<Registration>>,
    sent: Mutex<Vec<(Vec<u8>, bool)>>,
    fail_register: bool,
    fail_unregister: bool,
}

impl RecordingCanTransport {
    pub(crate) fn failing_register() -> Self {
        Self {
            fail_register: true,
            ..Default::default()
        }
    }

    pub(crate) fn failing_unregister() -> Self {
        Self {
            fail_unregister: true,
            ..Default::default()
        }
    }

    pub(crate) fn registration_count(&self) -> usize {
        self.registrations.lock().expect("lock registrations").len()
    }

    pub(crate) fn sent(&self) -> Vec<(Vec<u8>, bool)> {
        self.sent.lock().expect("lock sent").clone()
    }

    pub(crate) fn inject(&self, frame: &[u8]) -> usize {
        let can_id = read_can_id(frame).expect("frame carries an identifier");
        let matching: Vec<_> = self
            .registrations
            .lock()
            .expect("lock registrations")
            .iter()
            .filter(|(filter, _)| filter.matches(can_id))
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in &matching {
            listener.on_frame(frame);
        }
        matching.len()
    }
}

#[async_trait]
impl CanTransport for RecordingCanTransport {
    async fn register_receiver(
        &self,
        filter: CanFilter,
        listener: Arc<dyn CanFrameListener>,
    ) -> Result<(), TransportError> {
        if self.fail_register {
            return Err(TransportError::Rejected("register disabled".to_string()));
        }
        self.registrations
            .lock()
            .expect("lock registrations")
            .push((filter, listener));
        Ok(())
    }

    async fn unregister_receiver(
        &self,
        filter: CanFilter,
        listener: Arc<dyn CanFrameListener>,
    ) -> Result<(), TransportError> {
        if self.fail_unregister {
            return Err(TransportError::Rejected("unregister disabled".to_string()));
        }
        let mut registrations = self.registrations.lock().expect("lock registrations");
        let before = registrations.len();
        registrations.retain(|(f, l)| !(*f == filter && same_listener(l, &listener)));
        if registrations.len() == before {
            return Err(TransportError::Other("no such registration".to_string()));
        }
        Ok(())
    }

    fn send(&self, frame: &[u8], echo: bool) -> Result<(), TransportError> {
        self.sent
            .lock()
            .expect("lock sent")
            .push((frame.to_vec(), echo));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNetStack {
    delivered: Mutex<Vec<(String, Vec<u8>)>>,
    failure: Option<TransportError>,
}

impl RecordingNetStack {
    pub(crate) fn failing(error: TransportError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub(crate) fn delivered(&self) -> Vec<(String, Vec<u8>)> {
        self.delivered.lock().expect("lock delivered").clone()
    }
}

impl NetStack for RecordingNetStack {
    fn deliver(&self, interface: &str, frame: Vec<u8>) -> Result<(), TransportError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.delivered
            .lock()
            .expect("lock delivered")
            .push((interface.to_string(), frame));
        Ok(())
    }
}
