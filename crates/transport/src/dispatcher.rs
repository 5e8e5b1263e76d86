//! Inbound message routing.
//!
//! Each decoded message passes through exactly once, in arrival order:
//! pending request correlations first, then typed per-kind routes, then the
//! generic broadcast stream. Typed routes firing before the generic stream
//! is part of the adapter contract.
use std::collections::{HashMap, VecDeque};

use tokio::sync::{broadcast, mpsc, oneshot};

use protocol::{ServerMessage, ServerMessageKind};

pub struct Dispatcher {
    pending: HashMap<ServerMessageKind, VecDeque<oneshot::Sender<ServerMessage>>>,
    routes: HashMap<ServerMessageKind, Vec<mpsc::UnboundedSender<ServerMessage>>>,
    events: broadcast::Sender<ServerMessage>,
}

impl Dispatcher {
    pub fn new(event_capacity: usize) -> Self {
        Self {
            pending: HashMap::new(),
            routes: HashMap::new(),
            events: broadcast::channel(event_capacity).0,
        }
    }

    /// Subscribes to the generic stream (every inbound message, in order).
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.events.subscribe()
    }

    /// Registers a typed route invoked for each message of `kind` before
    /// the generic stream sees it. Routes with dropped receivers are pruned
    /// on the next matching message.
    pub fn register_route(&mut self, kind: ServerMessageKind) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes.entry(kind).or_default().push(tx);
        rx
    }

    /// Queues a one-shot correlation: the next message of `kind` resolves
    /// the returned receiver. Waiters are served oldest first.
    pub fn expect_response(&mut self, kind: ServerMessageKind) -> oneshot::Receiver<ServerMessage> {
        let (tx, rx) = oneshot::channel();
        self.pending.entry(kind).or_default().push_back(tx);
        rx
    }

    /// Delivers one inbound message.
    pub fn dispatch(&mut self, message: ServerMessage) {
        let kind = message.kind();

        // Correlations: skip waiters whose timeout already dropped the
        // receiving end, fulfill at most one live waiter.
        if let Some(waiters) = self.pending.get_mut(&kind) {
            while let Some(waiter) = waiters.pop_front() {
                if waiter.send(message.clone()).is_ok() {
                    break;
                }
            }
            if waiters.is_empty() {
                self.pending.remove(&kind);
            }
        }

        if let Some(routes) = self.routes.get_mut(&kind) {
            routes.retain(|route| route.send(message.clone()).is_ok());
        }

        // No subscribers on the generic stream is normal, not an error.
        if self.events.send(message).is_err() {
            tracing::trace!(%kind, "no generic subscribers for message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::PlayerId;

    fn turn_started(id: &str) -> ServerMessage {
        ServerMessage::TurnStarted {
            active_player_id: PlayerId::from(id),
        }
    }

    #[tokio::test]
    async fn delivers_to_correlation_route_and_stream() {
        let mut dispatcher = Dispatcher::new(8);
        let waiter = dispatcher.expect_response(ServerMessageKind::TurnStarted);
        let mut route = dispatcher.register_route(ServerMessageKind::TurnStarted);
        let mut stream = dispatcher.subscribe();

        dispatcher.dispatch(turn_started("p1"));

        assert_eq!(waiter.await.unwrap(), turn_started("p1"));
        assert_eq!(route.recv().await.unwrap(), turn_started("p1"));
        assert_eq!(stream.recv().await.unwrap(), turn_started("p1"));
    }

    #[tokio::test]
    async fn correlation_fires_once_and_skips_dead_waiters() {
        let mut dispatcher = Dispatcher::new(8);

        // First waiter gave up (timeout dropped the receiver).
        drop(dispatcher.expect_response(ServerMessageKind::TurnStarted));
        let second = dispatcher.expect_response(ServerMessageKind::TurnStarted);

        dispatcher.dispatch(turn_started("p1"));
        assert_eq!(second.await.unwrap(), turn_started("p1"));

        // A fulfilled correlation does not linger.
        let mut stream = dispatcher.subscribe();
        dispatcher.dispatch(turn_started("p2"));
        assert_eq!(stream.recv().await.unwrap(), turn_started("p2"));
    }

    #[tokio::test]
    async fn typed_routes_only_see_their_kind() {
        let mut dispatcher = Dispatcher::new(8);
        let mut route = dispatcher.register_route(ServerMessageKind::FightStarted);

        dispatcher.dispatch(turn_started("p1"));
        assert!(route.try_recv().is_err());

        dispatcher.dispatch(ServerMessage::FightStarted {
            player1_id: PlayerId::from("p1"),
            player2_id: PlayerId::from("p2"),
        });
        assert!(route.try_recv().is_ok());
    }
}
