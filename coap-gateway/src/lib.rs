//! Wires the codec (`coap-core`) and broker (`coap-broker`) into a
//! running process: UDP ingress/egress, the duplicate-rejection pipeline,
//! and a gRPC streaming façade onto the broker for remote subscribers.

pub mod config;
pub mod error;
pub mod grpc;
pub mod pipeline;
pub mod responder;
pub mod socket;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use socket::GatewaySocket;
