//! The gRPC subscription façade: a thin translation layer between
//! `tonic`'s streaming service traits and the broker's native API.
//! `coap-gateway` is the only crate that knows about `tonic`;
//! `coap-broker` stays transport-agnostic.

use std::pin::Pin;

use futures_util::StreamExt;
use tokio_stream::wrappers::{ReceiverStream, UnboundedReceiverStream};
use tonic::{Request, Response, Status, Streaming};

use coap_broker::{Broker, BrokerError};
use std::sync::Arc;

pub mod proto {
    tonic::include_proto!("coap_gateway.broker");
}

use proto::broker_server::{Broker as BrokerService, BrokerServer};
use proto::{Action, Empty, Path, PublisherResponse, SubscriptionRequest};

impl From<BrokerError> for Status {
    fn from(err: BrokerError) -> Self {
        match err {
            BrokerError::MissingSubscriber(id) => {
                Status::not_found(format!("subscriber {id} is not known to the broker"))
            }
            BrokerError::MissingBrokerBucket(bucket) => {
                Status::failed_precondition(format!("expected broker bucket {bucket} was missing"))
            }
        }
    }
}

/// Rejects a [`Path`] whose segments are empty or contain `/`.
fn validate_path(path: &Path) -> Result<(), Status> {
    for segment in &path.segments {
        if segment.is_empty() || segment.contains('/') {
            return Err(Status::invalid_argument(format!(
                "invalid path segment: {segment:?}"
            )));
        }
    }
    Ok(())
}

pub struct BrokerGrpc {
    broker: Arc<Broker>,
}

impl BrokerGrpc {
    pub fn new(broker: Arc<Broker>) -> Self {
        BrokerGrpc { broker }
    }

    pub fn into_server(self) -> BrokerServer<Self> {
        BrokerServer::new(self)
    }
}

#[tonic::async_trait]
impl BrokerService for BrokerGrpc {
    type SubscribeStream =
        Pin<Box<dyn tokio_stream::Stream<Item = Result<PublisherResponse, Status>> + Send + 'static>>;

    async fn subscribe(
        &self,
        request: Request<Streaming<SubscriptionRequest>>,
    ) -> Result<Response<Self::SubscribeStream>, Status> {
        let broker = Arc::clone(&self.broker);
        let mut inbound = request.into_inner();
        let id = broker.next_id();

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(async move {
            let mut mailbox: Option<tokio::sync::mpsc::UnboundedReceiver<_>> = None;

            loop {
                tokio::select! {
                    next = inbound.next() => {
                        match next {
                            Some(Ok(req)) => {
                                if let Some(bad) = req.paths.iter().find_map(|p| validate_path(p).err()) {
                                    let _ = tx.send(Err(bad)).await;
                                    continue;
                                }
                                let paths: Vec<String> = req.paths.iter().map(|p| p.segments.join("/")).collect();
                                match Action::try_from(req.action) {
                                    Ok(Action::Add) => {
                                        if let Some(new_rx) = broker.add_subscriber_to(&paths, id) {
                                            mailbox = Some(new_rx);
                                        }
                                    }
                                    Ok(Action::Remove) => {
                                        broker.remove_subscriptions(&paths, id);
                                    }
                                    Err(_) => {
                                        let _ = tx.send(Err(Status::invalid_argument("unknown action"))).await;
                                    }
                                }
                            }
                            Some(Err(_)) | None => break,
                        }
                    }
                    message = async {
                        match mailbox.as_mut() {
                            Some(rx) => rx.recv().await,
                            None => std::future::pending().await,
                        }
                    } => {
                        match message {
                            Some(published) => {
                                let response = PublisherResponse {
                                    path: Some(Path { segments: published.path.split('/').map(str::to_string).collect() }),
                                    content: String::from_utf8_lossy(&published.content).into_owned(),
                                };
                                if tx.send(Ok(response)).await.is_err() {
                                    break;
                                }
                            }
                            None => continue,
                        }
                    }
                }
            }

            let _ = broker.remove_subscriber(id);
        });

        let stream = ReceiverStream::new(rx);
        Ok(Response::new(Box::pin(stream)))
    }

    type GetTopicsStream = Pin<Box<dyn tokio_stream::Stream<Item = Result<Path, Status>> + Send + 'static>>;

    async fn get_topics(&self, _request: Request<Empty>) -> Result<Response<Self::GetTopicsStream>, Status> {
        let topics = self.broker.get_topics();
        let paths: Vec<Result<Path, Status>> = topics
            .into_iter()
            .map(|topic| Ok(Path { segments: topic.split('/').map(str::to_string).collect() }))
            .collect();
        let stream = UnboundedReceiverStream::new({
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
            for path in paths {
                let _ = tx.send(path);
            }
            rx
        });
        Ok(Response::new(Box::pin(stream)))
    }
}
