//! Process entry point: a thin `#[tokio::main]` wrapper that loads
//! config, constructs the broker and duplicate tracker, and spawns the
//! ingress, egress, and gRPC tasks until a `ctrl_c` signal.

use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use tokio::sync::mpsc;
use tonic::transport::Server;

use coap_broker::{Broker, DuplicateTracker};
use coap_gateway::config::GatewayConfig;
use coap_gateway::grpc::BrokerGrpc;
use coap_gateway::pipeline::handle_datagram;
use coap_gateway::socket::GatewaySocket;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = GatewayConfig::load().context("loading gateway configuration")?;
    tracing::info!(udp_port = config.udp_port, grpc_bind_addr = %config.grpc_bind_addr, "starting coap-gateway");

    let broker = Arc::new(Broker::new());
    let tracker: Arc<DuplicateTracker<(std::net::SocketAddr, coap_core::CoapId)>> =
        Arc::new(DuplicateTracker::new());

    let socket = Arc::new(
        GatewaySocket::bind(([0, 0, 0, 0], config.udp_port).into())
            .await
            .context("binding UDP ingress socket")?,
    );

    let (egress_tx, mut egress_rx) = mpsc::unbounded_channel::<(std::net::SocketAddr, Bytes)>();

    let egress_socket = Arc::clone(&socket);
    let egress_task = tokio::spawn(async move {
        while let Some((peer, bytes)) = egress_rx.recv().await {
            if let Err(err) = egress_socket.send(peer, bytes).await {
                tracing::warn!(?peer, %err, "failed to send reply datagram");
            }
        }
    });

    let ingress_socket = Arc::clone(&socket);
    let ingress_broker = Arc::clone(&broker);
    let ingress_tracker = Arc::clone(&tracker);
    let duplicate_window = config.duplicate_window();
    let ingress_task = tokio::spawn(async move {
        loop {
            match ingress_socket.recv().await {
                Ok((peer, bytes)) => {
                    handle_datagram(
                        peer,
                        bytes,
                        &ingress_tracker,
                        &ingress_broker,
                        &egress_tx,
                        duplicate_window,
                    )
                    .await;
                }
                Err(err) => {
                    tracing::error!(%err, "udp ingress read failed, stopping ingress loop");
                    break;
                }
            }
        }
    });

    let grpc_broker = Arc::clone(&broker);
    let grpc_addr = config.grpc_bind_addr;
    let grpc_task = tokio::spawn(async move {
        let service = BrokerGrpc::new(grpc_broker).into_server();
        Server::builder()
            .add_service(service)
            .serve(grpc_addr)
            .await
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl_c, shutting down");
        }
        result = ingress_task => {
            result.context("ingress task panicked")?;
        }
        result = egress_task => {
            result.context("egress task panicked")?;
        }
        result = grpc_task => {
            result.context("grpc task panicked")?.context("grpc server failed")?;
        }
    }

    Ok(())
}
