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

//! In-memory CAN and network-stack transports for exercising `ce-gateway` without sockets.
//!
//! [`LoopbackCanBus`] behaves like a single CAN interface: injected frames reach every
//! receiver whose filter matches, and frames sent with echo are seen by local receivers too.
//! [`RecordingNetStack`] keeps every frame the gateway hands to a virtual interface.

use async_trait::async_trait;
use ce_gateway::{CanFilter, CanFrameListener, CanTransport, NetStack, TransportError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn frame_can_id(frame: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = frame.get(..4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

fn same_listener(a: &Arc<dyn CanFrameListener>, b: &Arc<dyn CanFrameListener>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// A frame handed to [`LoopbackCanBus::send`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SentFrame {
    pub frame: Vec<u8>,
    pub echo: bool,
}

struct Registration {
    filter: CanFilter,
    listener: Arc<dyn CanFrameListener>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum FailureMode {
    #[default]
    None,
    Register,
    Unregister,
    Send,
}

pub struct LoopbackCanBus {
    name: String,
    registrations: Mutex<Vec<Registration>>,
    sent: Mutex<Vec<SentFrame>>,
    failure: FailureMode,
}

impl LoopbackCanBus {
    pub fn new(name: &str) -> Self {
        Self::with_failure(name, FailureMode::None)
    }

    /// A bus refusing every receiver registration.
    pub fn failing_register(name: &str) -> Self {
        Self::with_failure(name, FailureMode::Register)
    }

    /// A bus that accepts receivers but refuses to remove them.
    pub fn failing_unregister(name: &str) -> Self {
        Self::with_failure(name, FailureMode::Unregister)
    }

    /// A bus whose transmit queue is always unavailable.
    pub fn failing_send(name: &str) -> Self {
        Self::with_failure(name, FailureMode::Send)
    }

    fn with_failure(name: &str, failure: FailureMode) -> Self {
        Self {
            name: name.to_string(),
            registrations: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            failure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registration_count(&self) -> usize {
        lock(&self.registrations).len()
    }

    pub fn sent(&self) -> Vec<SentFrame> {
        lock(&self.sent).clone()
    }

    /// Delivers `frame` as if it arrived from the wire. Returns how many receivers saw it.
    ///
    /// Frames too short to carry an identifier reach no receiver.
    pub fn inject(&self, frame: &[u8]) -> usize {
        let Some(can_id) = frame_can_id(frame) else {
            debug!(bus = self.name.as_str(), len = frame.len(), "ignoring runt frame");
            return 0;
        };

        // Listeners run without the registration lock held; they may call back into the bus.
        let listeners: Vec<Arc<dyn CanFrameListener>> = lock(&self.registrations)
            .iter()
            .filter(|registration| registration.filter.matches(can_id))
            .map(|registration| registration.listener.clone())
            .collect();

        trace!(
            bus = self.name.as_str(),
            can_id = format_args!("{can_id:#x}"),
            receivers = listeners.len(),
            "delivering frame"
        );
        for listener in &listeners {
            listener.on_frame(frame);
        }
        listeners.len()
    }
}

#[async_trait]
impl CanTransport for LoopbackCanBus {
    async fn register_receiver(
        &self,
        filter: CanFilter,
        listener: Arc<dyn CanFrameListener>,
    ) -> Result<(), TransportError> {
        if self.failure == FailureMode::Register {
            return Err(TransportError::Rejected(format!(
                "{}: receiver registration refused",
                self.name
            )));
        }
        debug!(bus = self.name.as_str(), ?filter, "registering receiver");
        lock(&self.registrations).push(Registration { filter, listener });
        Ok(())
    }

    async fn unregister_receiver(
        &self,
        filter: CanFilter,
        listener: Arc<dyn CanFrameListener>,
    ) -> Result<(), TransportError> {
        if self.failure == FailureMode::Unregister {
            return Err(TransportError::Rejected(format!(
                "{}: receiver removal refused",
                self.name
            )));
        }
        let mut registrations = lock(&self.registrations);
        let position = registrations.iter().position(|registration| {
            registration.filter == filter && same_listener(&registration.listener, &listener)
        });
        match position {
            Some(position) => {
                registrations.remove(position);
                debug!(bus = self.name.as_str(), ?filter, "unregistered receiver");
                Ok(())
            }
            None => Err(TransportError::Other(format!(
                "{}: no receiver registered for {filter:?}",
                self.name
            ))),
        }
    }

    fn send(&self, frame: &[u8], echo: bool) -> Result<(), TransportError> {
        if self.failure == FailureMode::Send {
            return Err(TransportError::Unavailable);
        }
        lock(&self.sent).push(SentFrame {
            frame: frame.to_vec(),
            echo,
        });
        if echo {
            self.inject(frame);
        }
        Ok(())
    }
}

/// Records frames delivered to the host on behalf of virtual interfaces.
#[derive(Default)]
pub struct RecordingNetStack {
    delivered: Mutex<Vec<(String, Vec<u8>)>>,
    failure: Option<TransportError>,
}

impl RecordingNetStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack rejecting every delivery with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    /// Every delivery in arrival order, tagged with the interface name.
    pub fn delivered(&self) -> Vec<(String, Vec<u8>)> {
        lock(&self.delivered).clone()
    }

    pub fn delivered_on(&self, interface: &str) -> Vec<Vec<u8>> {
        lock(&self.delivered)
            .iter()
            .filter(|(name, _)| name == interface)
            .map(|(_, frame)| frame.clone())
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.delivered).clear();
    }
}

impl NetStack for RecordingNetStack {
    fn deliver(&self, interface: &str, frame: Vec<u8>) -> Result<(), TransportError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        trace!(interface, len = frame.len(), "frame delivered to host");
        lock(&self.delivered).push((interface.to_string(), frame));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LoopbackCanBus, RecordingNetStack, SentFrame};
    use ce_gateway::frame::CanFrame;
    use ce_gateway::{CanFilter, CanFrameListener, CanTransport, NetStack, TransportError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl CanFrameListener for Counter {
        fn on_frame(&self, _frame: &[u8]) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn frame(id: u32) -> Vec<u8> {
        CanFrame::new(id, &[0xAA]).expect("frame").to_bytes().to_vec()
    }

    #[tokio::test]
    async fn inject_honors_receiver_filters() {
        let bus = LoopbackCanBus::new("can0");
        let exact = Arc::new(Counter::default());
        let all = Arc::new(Counter::default());
        bus.register_receiver(CanFilter::new(0x100, 0x7FF), exact.clone())
            .await
            .expect("register");
        bus.register_receiver(CanFilter::MATCH_ALL, all.clone())
            .await
            .expect("register");

        assert_eq!(bus.inject(&frame(0x100)), 2);
        assert_eq!(bus.inject(&frame(0x101)), 1);
        assert_eq!(bus.inject(&[0x01, 0x02]), 0);
        assert_eq!(exact.0.load(Ordering::Relaxed), 1);
        assert_eq!(all.0.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn send_with_echo_reaches_local_receivers() {
        let bus = LoopbackCanBus::new("can0");
        let listener = Arc::new(Counter::default());
        bus.register_receiver(CanFilter::MATCH_ALL, listener.clone())
            .await
            .expect("register");

        bus.send(&frame(0x1), false).expect("send");
        bus.send(&frame(0x2), true).expect("send");

        assert_eq!(listener.0.load(Ordering::Relaxed), 1);
        assert_eq!(
            bus.sent(),
            vec![
                SentFrame { frame: frame(0x1), echo: false },
                SentFrame { frame: frame(0x2), echo: true },
            ]
        );
    }

    #[tokio::test]
    async fn unregister_requires_matching_filter_and_listener() {
        let bus = LoopbackCanBus::new("can0");
        let listener = Arc::new(Counter::default());
        let other: Arc<Counter> = Arc::new(Counter::default());
        bus.register_receiver(CanFilter::MATCH_ALL, listener.clone())
            .await
            .expect("register");

        assert!(bus
            .unregister_receiver(CanFilter::new(1, 1), listener.clone())
            .await
            .is_err());
        assert!(bus
            .unregister_receiver(CanFilter::MATCH_ALL, other)
            .await
            .is_err());
        bus.unregister_receiver(CanFilter::MATCH_ALL, listener)
            .await
            .expect("unregister");
        assert_eq!(bus.registration_count(), 0);
    }

    #[tokio::test]
    async fn failure_modes_surface_transport_errors() {
        let refusing = LoopbackCanBus::failing_register("can1");
        assert!(matches!(
            refusing
                .register_receiver(CanFilter::MATCH_ALL, Arc::new(Counter::default()))
                .await,
            Err(TransportError::Rejected(_))
        ));

        let sticky = LoopbackCanBus::failing_unregister("can3");
        let listener: Arc<dyn CanFrameListener> = Arc::new(Counter::default());
        sticky
            .register_receiver(CanFilter::MATCH_ALL, listener.clone())
            .await
            .expect("registration accepted");
        assert!(matches!(
            sticky.unregister_receiver(CanFilter::MATCH_ALL, listener).await,
            Err(TransportError::Rejected(_))
        ));
        assert_eq!(sticky.registration_count(), 1);

        let down = LoopbackCanBus::failing_send("can2");
        assert_eq!(down.send(&frame(0x1), true), Err(TransportError::Unavailable));
        assert!(down.sent().is_empty());
    }

    #[test]
    fn net_stack_groups_deliveries_by_interface() {
        let net = RecordingNetStack::new();
        net.deliver("ceth0", vec![1]).expect("deliver");
        net.deliver("ceth1", vec![2]).expect("deliver");
        net.deliver("ceth0", vec![3]).expect("deliver");

        assert_eq!(net.delivered_on("ceth0"), vec![vec![1], vec![3]]);
        assert_eq!(net.delivered().len(), 3);
        net.clear();
        assert!(net.delivered().is_empty());

        let failing = RecordingNetStack::failing(TransportError::Unavailable);
        assert_eq!(failing.deliver("ceth0", vec![1]), Err(TransportError::Unavailable));
    }
}
