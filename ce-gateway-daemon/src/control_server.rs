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

//! Newline-delimited JSON control channel.
//!
//! Each request line is one [`ControlRequest`]; each reply is written as one
//! [`ControlResponse`] line. `list_routes` replies with one line per route and a final
//! `done` line.

use ce_gateway::control::{ControlHandler, ControlRequest, ControlResponse};
use ce_gateway::observability::events;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const COMPONENT: &str = "control_server";

// Persistent accept errors (e.g. EMFILE) would otherwise spin the loop.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Accepts control connections until `stop` flips to `true`.
pub(crate) async fn serve(
    listener: TcpListener,
    handler: ControlHandler,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!(component = COMPONENT, err = %err, "accept failed");
                    if stopped_during_retry_delay(&mut stop).await {
                        debug!(component = COMPONENT, "control server stopping");
                        break;
                    }
                    continue;
                }
            },
            _ = stop.changed() => {
                debug!(component = COMPONENT, "control server stopping");
                break;
            }
        };

        info!(component = COMPONENT, %peer, "control client connected");
        let handler = handler.clone();
        tokio::spawn(async move {
            let (reader, writer) = stream.into_split();
            if let Err(err) = handle_connection(reader, writer, &handler, peer).await {
                warn!(
                    event = events::CONTROL_RESPONSE_FAILED,
                    component = COMPONENT,
                    %peer,
                    err = %err,
                    "control connection closed with error"
                );
            }
        });
    }
}

/// Waits out [`ACCEPT_RETRY_DELAY`]; `true` if a stop was requested meanwhile.
async fn stopped_during_retry_delay(stop: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(ACCEPT_RETRY_DELAY) => false,
        _ = stop.changed() => true,
    }
}

async fn handle_connection<R, W>(
    reader: R,
    mut writer: W,
    handler: &ControlHandler,
    peer: SocketAddr,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let responses = match serde_json::from_str::<ControlRequest>(&line) {
            Ok(request) => handler.handle(request).await,
            Err(err) => {
                debug!(component = COMPONENT, %peer, err = %err, "undecodable control request");
                vec![ControlResponse::invalid_request(err.to_string())]
            }
        };
        for response in responses {
            let mut encoded = serde_json::to_vec(&response).map_err(io::Error::other)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
        }
        writer.flush().await?;
    }
    Ok(())
}
