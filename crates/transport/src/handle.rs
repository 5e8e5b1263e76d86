//! Connection setup and the cloneable handle for talking to the server.
//!
//! [`Transport::connect`] opens the socket and spawns a reader and a writer
//! task; everything else goes through [`TransportHandle`], which hides the
//! channel plumbing and offers fire-and-forget sends, correlated
//! request/response waits, typed routes, and the generic subscription.
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, trace, warn};

use protocol::{ClientMessage, ServerMessage, ServerMessageKind};

use crate::dispatcher::Dispatcher;
use crate::error::TransportError;

#[derive(Clone, Debug)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    /// Default wait for correlated request/response pairs.
    pub request_timeout: Duration,
    /// Buffer size of the generic broadcast stream.
    pub event_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            event_capacity: 256,
        }
    }
}

/// Connection factory.
pub struct Transport;

impl Transport {
    /// Opens the WebSocket connection and starts the I/O tasks.
    ///
    /// Blocks until the connection is established or the connect timeout
    /// elapses.
    pub async fn connect(
        url: &str,
        config: TransportConfig,
    ) -> Result<TransportHandle, TransportError> {
        let (stream, _) = tokio::time::timeout(config.connect_timeout, connect_async(url))
            .await
            .map_err(|_| TransportError::ConnectTimeout(config.connect_timeout))?
            .map_err(TransportError::Connect)?;
        debug!(url, "connected");

        let (mut sink, mut frames) = stream.split();
        let dispatcher = Arc::new(Mutex::new(Dispatcher::new(config.event_capacity)));
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(64);

        tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(error) = sink.send(Message::Text(text)).await {
                    warn!(%error, "outbound send failed, stopping writer");
                    break;
                }
            }
        });

        let reader_dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(Message::Text(text)) => match ServerMessage::decode(&text) {
                        Ok(message) => {
                            trace!(kind = %message.kind(), "inbound message");
                            reader_dispatcher.lock().await.dispatch(message);
                        }
                        // Out-of-vocabulary types are reported and skipped;
                        // a protocol addition must not kill the session.
                        Err(error) if error.is_unknown_type() => {
                            warn!(%error, "skipping frame");
                        }
                        Err(error) => {
                            warn!(%error, "dropping undecodable frame");
                        }
                    },
                    Ok(Message::Close(_)) => {
                        debug!("server closed the connection");
                        break;
                    }
                    // Ping/pong and binary frames carry nothing for us.
                    Ok(_) => {}
                    Err(error) => {
                        warn!(%error, "read failed, stopping reader");
                        break;
                    }
                }
            }
            // Dropping the dispatcher reference here ends the broadcast
            // stream once the handle side is gone too; subscribers observe
            // the close as their connectivity event.
        });

        Ok(TransportHandle {
            outbound: outbound_tx,
            dispatcher,
            config,
        })
    }
}

/// Cloneable handle to one live connection.
#[derive(Clone)]
pub struct TransportHandle {
    outbound: mpsc::Sender<String>,
    dispatcher: Arc<Mutex<Dispatcher>>,
    config: TransportConfig,
}

impl TransportHandle {
    /// Fire-and-forget send.
    pub async fn send(&self, message: &ClientMessage) -> Result<(), TransportError> {
        let text = message.encode().map_err(|source| TransportError::Encode {
            kind: message.kind(),
            source,
        })?;
        trace!(kind = %message.kind(), "outbound message");
        self.outbound
            .send(text)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }

    /// Sends a request and blocks for the correlated response.
    ///
    /// `expected` defaults to the request's conventional response kind;
    /// `timeout` defaults to the configured request timeout. The
    /// correlation is registered before the send so a fast reply cannot
    /// race the waiter. The response still flows through the generic
    /// stream (the reducer pipeline sees every message exactly once); this
    /// return value is for control flow only.
    pub async fn send_and_wait(
        &self,
        message: &ClientMessage,
        expected: Option<ServerMessageKind>,
        timeout: Option<Duration>,
    ) -> Result<ServerMessage, TransportError> {
        let expected = expected.unwrap_or_else(|| message.expected_response());
        let waited = timeout.unwrap_or(self.config.request_timeout);

        let reply = self.dispatcher.lock().await.expect_response(expected);
        self.send(message).await?;

        match tokio::time::timeout(waited, reply).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(TransportError::Closed { expected }),
            Err(_) => Err(TransportError::Timeout { expected, waited }),
        }
    }

    /// Typed route for one message kind, delivered before the generic
    /// stream for each matching message.
    pub async fn on_message_type(
        &self,
        kind: ServerMessageKind,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        self.dispatcher.lock().await.register_route(kind)
    }

    /// Generic stream of every inbound message, in arrival order.
    pub async fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.dispatcher.lock().await.subscribe()
    }
}
