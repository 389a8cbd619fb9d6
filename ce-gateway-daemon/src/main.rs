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

mod bootstrap;
mod config;
mod control_server;

use crate::config::Config;
use ce_gateway::control::ControlHandler;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "CAN <-> Ethernet gateway daemon")]
struct GatewayArgs {
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let args = GatewayArgs::parse();
    let config = Config::load(&args.config)?;
    info!(gateway = config.gateway.name.as_str(), "starting ce-gateway-daemon");

    let runtime = bootstrap::build(&config).await?;
    info!(
        can_interfaces = runtime.buses.len(),
        routes = runtime.gateway.list_routes(0).iter().count(),
        "gateway configured"
    );

    let listener = TcpListener::bind(&config.control.listen_address)
        .await
        .map_err(|e| format!("unable to bind {}: {e}", config.control.listen_address))?;
    info!(address = %listener.local_addr()?, "control channel listening");

    let (stop_tx, stop_rx) = watch::channel(false);
    let server = tokio::spawn(control_server::serve(
        listener,
        ControlHandler::new(runtime.gateway.clone()),
        stop_rx,
    ));

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    let _ = stop_tx.send(true);
    server.await?;
    runtime.gateway.shutdown().await;

    Ok(())
}
