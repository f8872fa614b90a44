//! Layered configuration for the gateway process.
//!
//! The one setting that actually matters downstream is the primary UDP
//! port. Everything else here is the ambient stack needed to actually
//! boot a process (the duplicate-tracker window and the gRPC bind
//! address both need some home, and this is it).

use std::net::SocketAddr;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

fn default_udp_port() -> u16 {
    5683
}

fn default_grpc_bind_addr() -> SocketAddr {
    "0.0.0.0:50051".parse().expect("valid default bind address")
}

fn default_duplicate_window_secs() -> u64 {
    coap_broker::EXCHANGE_LIFETIME.as_secs()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// UDP port the CoAP ingress socket binds to.
    #[serde(default = "default_udp_port")]
    pub udp_port: u16,

    /// How long a `(peer, message id)` pair is held by the duplicate
    /// tracker before it is eligible to be seen again.
    #[serde(default = "default_duplicate_window_secs")]
    pub duplicate_window_secs: u64,

    /// Bind address for the gRPC subscription façade.
    #[serde(default = "default_grpc_bind_addr")]
    pub grpc_bind_addr: SocketAddr,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            udp_port: default_udp_port(),
            duplicate_window_secs: default_duplicate_window_secs(),
            grpc_bind_addr: default_grpc_bind_addr(),
        }
    }
}

impl GatewayConfig {
    pub fn duplicate_window(&self) -> Duration {
        Duration::from_secs(self.duplicate_window_secs)
    }

    /// Layers, lowest to highest precedence: built-in defaults, an
    /// optional `gateway.toml` in the working directory, then
    /// `COAP_GW_`-prefixed environment variables (e.g.
    /// `COAP_GW_UDP_PORT=5684`).
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(GatewayConfig::default()))
            .merge(Toml::file("gateway.toml"))
            .merge(Env::prefixed("COAP_GW_"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = GatewayConfig::default();
        assert_eq!(config.udp_port, 5683);
        assert_eq!(config.duplicate_window(), coap_broker::EXCHANGE_LIFETIME);
    }

    #[test]
    fn env_var_overrides_default_port() {
        std::env::set_var("COAP_GW_TEST_UDP_PORT", "5684");
        let config: GatewayConfig = Figment::from(Serialized::defaults(GatewayConfig::default()))
            .merge(Env::prefixed("COAP_GW_TEST_"))
            .extract()
            .unwrap();
        std::env::remove_var("COAP_GW_TEST_UDP_PORT");
        assert_eq!(config.udp_port, 5684);
    }
}
