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

//! Canonical structured event names used across `ce-gateway`.

// Control-plane lifecycle events.
pub const ROUTE_ADD_START: &str = "route_add_start";
pub const ROUTE_ADD_OK: &str = "route_add_ok";
pub const ROUTE_ADD_FAILED: &str = "route_add_failed";
pub const ROUTE_DELETE_START: &str = "route_delete_start";
pub const ROUTE_DELETE_OK: &str = "route_delete_ok";
pub const ROUTE_DELETE_FAILED: &str = "route_delete_failed";
pub const ROUTE_CASCADE_FAILED: &str = "route_cascade_failed";

// Gateway and endpoint registry events.
pub const GATEWAY_CREATE: &str = "gateway_create";
pub const GATEWAY_SHUTDOWN: &str = "gateway_shutdown";
pub const ENDPOINT_REGISTER: &str = "endpoint_register";
pub const ENDPOINT_UNREGISTER: &str = "endpoint_unregister";

// CAN receive-path subscription events.
pub const CAN_SUBSCRIBE_OK: &str = "can_subscribe_ok";
pub const CAN_SUBSCRIBE_FAILED: &str = "can_subscribe_failed";
pub const CAN_UNSUBSCRIBE_OK: &str = "can_unsubscribe_ok";
pub const CAN_UNSUBSCRIBE_FAILED: &str = "can_unsubscribe_failed";

// Receive dispatcher events.
pub const FRAME_HANDLED: &str = "frame_handled";
pub const FRAME_DROPPED: &str = "frame_dropped";
pub const FRAME_TRANSLATION_UNIMPLEMENTED: &str = "frame_translation_unimplemented";

// Control command surface events.
pub const CONTROL_REQUEST: &str = "control_request";
pub const CONTROL_RESPONSE_FAILED: &str = "control_response_failed";
