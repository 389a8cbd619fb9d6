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

//! Interfaces the gateway consumes from the host's CAN and network stacks.

use crate::error::TransportError;
use crate::job::CanFilter;
use async_trait::async_trait;
use std::sync::Arc;

/// Receives frames matching a registered [`CanFilter`].
///
/// Called synchronously from the transport's receive context and must not block.
pub trait CanFrameListener: Send + Sync {
    /// `frame` is a serialized CAN (16 bytes) or CAN-FD (72 bytes) frame.
    fn on_frame(&self, frame: &[u8]);
}

/// A CAN interface the gateway can subscribe to and send on.
#[async_trait]
pub trait CanTransport: Send + Sync {
    async fn register_receiver(
        &self,
        filter: CanFilter,
        listener: Arc<dyn CanFrameListener>,
    ) -> Result<(), TransportError>;

    /// Removes a registration previously made with the same filter and listener.
    async fn unregister_receiver(
        &self,
        filter: CanFilter,
        listener: Arc<dyn CanFrameListener>,
    ) -> Result<(), TransportError>;

    /// Sends one serialized frame. With `echo` set, local receivers see the frame too.
    fn send(&self, frame: &[u8], echo: bool) -> Result<(), TransportError>;
}

/// Host network stack receiving frames on behalf of the gateway's virtual interfaces.
pub trait NetStack: Send + Sync {
    fn deliver(&self, interface: &str, frame: Vec<u8>) -> Result<(), TransportError>;
}
