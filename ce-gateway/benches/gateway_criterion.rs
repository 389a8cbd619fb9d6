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

use ce_gateway::frame::{BROADCAST_MAC, ETH_P_CAN, ETH_P_CANFD, ZERO_MAC};
use ce_gateway::{translator, JobFlags, JobKind, RouteRequest};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use integration_test_utils::{can_frame, canfd_frame, encapsulated_can, GatewayFixture};
use tokio::runtime::Builder;

const FANOUT_ROUTES: usize = 16;
const CHURN_ROUTES: usize = 64;

fn gateway_criterion(c: &mut Criterion) {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("benchmark runtime should build");

    let classic = can_frame(0x123, &[1, 2, 3, 4, 5, 6, 7, 8]);
    let fd = canfd_frame(0x123, 0x01, &[0xA5; 64]);
    let encapsulated = encapsulated_can(0x123, &[1, 2, 3, 4, 5, 6, 7, 8]);

    let mut translator_group = c.benchmark_group("translator");
    translator_group.bench_function("can_to_ethernet", |b| {
        b.iter(|| {
            translator::can_to_ethernet(&ZERO_MAC, &BROADCAST_MAC, ETH_P_CAN, black_box(&classic))
        });
    });
    translator_group.bench_function("canfd_to_ethernet", |b| {
        b.iter(|| {
            translator::canfd_to_ethernet(&ZERO_MAC, &BROADCAST_MAC, ETH_P_CANFD, black_box(&fd))
        });
    });
    translator_group.bench_function("decapsulate_can", |b| {
        b.iter(|| translator::decapsulate_can(black_box(&encapsulated)));
    });
    translator_group.finish();

    let fanout = runtime.block_on(async {
        let fixture = GatewayFixture::network_layer().await;
        for _ in 0..FANOUT_ROUTES {
            fixture
                .gateway
                .create_route(RouteRequest::new(
                    "can0",
                    "ceth0",
                    JobKind::NetworkLayer,
                    JobFlags::NONE,
                ))
                .await
                .expect("fan-out route should be admitted");
        }
        fixture
    });
    let reverse = runtime.block_on(async {
        let fixture = GatewayFixture::network_layer().await;
        fixture
            .gateway
            .create_route(RouteRequest::new(
                "ceth0",
                "can0",
                JobKind::NetworkLayer,
                JobFlags::NONE,
            ))
            .await
            .expect("reverse route should be admitted");
        fixture
    });

    let mut dispatch_group = c.benchmark_group("dispatch");
    dispatch_group.bench_function("can_ingress_fanout", |b| {
        b.iter(|| {
            let receivers = fanout.can.inject(black_box(&classic));
            fanout.net.clear();
            black_box(receivers);
        });
    });
    dispatch_group.bench_function("virtual_interface_transmit", |b| {
        b.iter(|| black_box(reverse.ceth.transmit(black_box(&encapsulated))));
    });
    dispatch_group.finish();

    let mut lifecycle_group = c.benchmark_group("route_lifecycle");
    lifecycle_group.bench_function("add_then_remove_all", |b| {
        b.iter_batched(
            || runtime.block_on(GatewayFixture::network_layer()),
            |fixture| {
                runtime.block_on(async {
                    for _ in 0..CHURN_ROUTES {
                        fixture
                            .gateway
                            .create_route(RouteRequest::new(
                                "can0",
                                "ceth0",
                                JobKind::NetworkLayer,
                                JobFlags::NONE,
                            ))
                            .await
                            .expect("churn route should be admitted");
                    }
                    let removed = fixture.gateway.remove_route(0).await;
                    assert_eq!(removed, CHURN_ROUTES);
                    black_box(removed);
                });
            },
            BatchSize::SmallInput,
        );
    });
    lifecycle_group.bench_function("list_routes", |b| {
        b.iter(|| black_box(fanout.gateway.list_routes(0).iter().count()));
    });
    lifecycle_group.finish();
}

criterion_group!(benches, gateway_criterion);
criterion_main!(benches);
