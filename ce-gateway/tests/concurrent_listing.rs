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

mod support;

use ce_gateway::JobId;
use integration_test_utils::{can_frame, GatewayFixture};
use std::sync::Arc;
use support::assert_add_route_ok;

#[tokio::test(flavor = "multi_thread")]
async fn listing_taken_before_removal_stays_complete() {
    let fixture = GatewayFixture::network_layer().await;
    let mut ids: Vec<JobId> = Vec::new();
    for _ in 0..16 {
        ids.push(assert_add_route_ok(&fixture.gateway, "can0", "ceth0").await);
    }

    let listing = fixture.gateway.list_routes(0);
    assert_eq!(fixture.gateway.remove_route(0).await, 16);

    let listed: Vec<JobId> = listing.iter().map(|job| job.id).collect();
    assert_eq!(listed, ids);
    assert!(fixture.gateway.list_routes(0).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn listing_and_traffic_run_alongside_route_churn() {
    let fixture = Arc::new(GatewayFixture::network_layer().await);
    for _ in 0..8 {
        assert_add_route_ok(&fixture.gateway, "can0", "ceth0").await;
    }

    let lister = {
        let fixture = fixture.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                for job in &fixture.gateway.list_routes(0) {
                    assert_eq!(job.src, "can0");
                    assert!(job.dropped == 0);
                }
                tokio::task::yield_now().await;
            }
        })
    };
    let traffic = {
        let fixture = fixture.clone();
        tokio::spawn(async move {
            for id in 0..200u32 {
                fixture.can.inject(&can_frame(id & 0x7FF, &[id as u8]));
                tokio::task::yield_now().await;
            }
        })
    };
    let churn = {
        let fixture = fixture.clone();
        tokio::spawn(async move {
            for _ in 0..20 {
                let id = assert_add_route_ok(&fixture.gateway, "can0", "ceth0").await;
                assert_eq!(fixture.gateway.remove_route(id).await, 1);
            }
        })
    };

    lister.await.expect("lister");
    traffic.await.expect("traffic");
    churn.await.expect("churn");

    assert_eq!(fixture.gateway.list_routes(0).iter().count(), 8);
    assert_eq!(fixture.can.registration_count(), 8);
    let handled: u32 = fixture.gateway.list_routes(0).iter().map(|job| job.handled).sum();
    assert_eq!(handled, 8 * 200);
}
