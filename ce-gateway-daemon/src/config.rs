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

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) gateway: GatewayConfig,
    pub(crate) control: ControlConfig,
    #[serde(default)]
    pub(crate) can_interfaces: Vec<CanInterfaceConfig>,
    #[serde(default)]
    pub(crate) virtual_interfaces: Vec<VirtualInterfaceConfig>,
    #[serde(default)]
    pub(crate) routes: Vec<RouteConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub(crate) name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ControlConfig {
    pub(crate) listen_address: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct CanInterfaceConfig {
    pub(crate) name: String,
    pub(crate) max_frame_size: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct VirtualInterfaceConfig {
    pub(crate) name: String,
    pub(crate) kind: u8,
    #[serde(default)]
    pub(crate) flags: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub(crate) src: String,
    pub(crate) dst: String,
    pub(crate) kind: u8,
    #[serde(default)]
    pub(crate) flags: u32,
}

impl Config {
    pub fn from_json5(contents: &str) -> Result<Self, Box<dyn Error>> {
        Ok(json5::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("unable to read config file {}: {e}", path.display()))?;
        Self::from_json5(&contents)
            .map_err(|e| format!("unable to parse config file {}: {e}", path.display()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn parses_full_config_with_comments() {
        let config = Config::from_json5(
            r#"{
                // the gateway instance
                gateway: { name: "ce-gw" },
                control: { listen_address: "127.0.0.1:7878" },
                can_interfaces: [ { name: "vcan0", max_frame_size: 16 } ],
                virtual_interfaces: [ { name: "ceth0", kind: 2 } ],
                routes: [ { src: "vcan0", dst: "ceth0", kind: 2, flags: 0 } ],
            }"#,
        )
        .expect("config parses");

        assert_eq!(config.gateway.name, "ce-gw");
        assert_eq!(config.can_interfaces[0].max_frame_size, 16);
        assert_eq!(config.virtual_interfaces[0].flags, 0);
        assert_eq!(config.routes[0].dst, "ceth0");
    }

    #[test]
    fn interface_and_route_lists_default_to_empty() {
        let config = Config::from_json5(
            r#"{ gateway: { name: "bare" }, control: { listen_address: "127.0.0.1:0" } }"#,
        )
        .expect("config parses");

        assert!(config.can_interfaces.is_empty());
        assert!(config.virtual_interfaces.is_empty());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_json5(
            r#"{ gateway: { name: "x", queue: 4 }, control: { listen_address: "127.0.0.1:0" } }"#,
        );
        assert!(err.is_err());
    }
}
