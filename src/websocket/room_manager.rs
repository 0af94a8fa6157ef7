use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A connection's subscription information.
pub struct ClientSubscription {
    /// Subscribed symbols, uppercased.
    pub symbols: HashSet<String>,
    /// Channel to send messages to the client.
    pub tx: mpsc::UnboundedSender<String>,
}

/// Per-connection subscription bookkeeping and broadcast fan-out.
///
/// `subscribe` replaces the connection's whole set while `unsubscribe`
/// removes only the named symbols. The asymmetry is deliberate: a
/// connection holds one active "view" at a time, and switching views
/// drops interest in everything outside the new list.
pub struct RoomManager {
    clients: DashMap<Uuid, ClientSubscription>,
}

impl RoomManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            clients: DashMap::new(),
        })
    }

    /// Register a new connection.
    pub fn register(&self, tx: mpsc::UnboundedSender<String>) -> Uuid {
        let client_id = Uuid::new_v4();
        self.clients.insert(
            client_id,
            ClientSubscription {
                symbols: HashSet::new(),
                tx,
            },
        );
        client_id
    }

    /// Drop all bookkeeping for a connection.
    pub fn unregister(&self, client_id: Uuid) {
        self.clients.remove(&client_id);
    }

    /// Replace the connection's subscription set with the given symbols.
    /// Returns the normalized set, sorted for stable replies.
    pub fn subscribe(&self, client_id: Uuid, symbols: &[String]) -> Vec<String> {
        let normalized: HashSet<String> = symbols.iter().map(|s| s.to_uppercase()).collect();
        let mut subscribed: Vec<String> = normalized.iter().cloned().collect();
        subscribed.sort();

        if let Some(mut client) = self.clients.get_mut(&client_id) {
            client.symbols = normalized;
        }

        subscribed
    }

    /// Remove only the given symbols from the connection's set.
    pub fn unsubscribe(&self, client_id: Uuid, symbols: &[String]) {
        if let Some(mut client) = self.clients.get_mut(&client_id) {
            for symbol in symbols {
                client.symbols.remove(&symbol.to_uppercase());
            }
        }
    }

    pub fn is_subscribed(&self, client_id: Uuid, symbol: &str) -> bool {
        self.clients
            .get(&client_id)
            .map(|c| c.symbols.contains(&symbol.to_uppercase()))
            .unwrap_or(false)
    }

    /// Deliver a message to every connection subscribed to the symbol.
    /// Sends to closed channels are swallowed; delivery is at-most-once.
    pub fn broadcast(&self, symbol: &str, message: &str) {
        let symbol = symbol.to_uppercase();
        for client in self.clients.iter() {
            if client.symbols.contains(&symbol) {
                let _ = client.tx.send(message.to_string());
            }
        }
    }

    /// Deliver a message to a single connection.
    pub fn send_to(&self, client_id: Uuid, message: &str) {
        if let Some(client) = self.clients.get(&client_id) {
            let _ = client.tx.send(message.to_string());
        }
    }

    /// Number of live connections.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}
