use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::types::{ClientMessage, ServerMessage, StockSnapshot};
use crate::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Channel for sending messages to this client; the simulation loop
    // pushes into it via the room manager.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let client_id = state.rooms.register(tx);
    info!("WebSocket client connected: {}", client_id);

    // Forward queued messages to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                debug!("Received message from {}: {}", client_id, text);
                handle_message(&state, client_id, &text);
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket client disconnecting: {}", client_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                // Pong is handled automatically by axum
                debug!("Received ping from {}", client_id);
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    state.rooms.unregister(client_id);
    send_task.abort();
    info!("WebSocket client disconnected: {}", client_id);
}

fn handle_message(state: &AppState, client_id: Uuid, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            // A malformed message is rejected without affecting the
            // connection or other clients.
            send_error(state, client_id, &format!("Invalid message: {}", e));
            return;
        }
    };

    match msg {
        ClientMessage::GetStocks => match state.store.all() {
            Ok(stocks) => {
                send_message(state, client_id, &ServerMessage::StocksInit { data: stocks });
            }
            Err(e) => {
                error!("Error fetching stocks for {}: {}", client_id, e);
                send_error(state, client_id, "Failed to load stocks");
            }
        },
        ClientMessage::SubscribeStocks { symbols } => {
            let subscribed = state.rooms.subscribe(client_id, &symbols);
            debug!("Client {} subscribed only to: {:?}", client_id, subscribed);
            send_snapshots(state, client_id, &subscribed);
        }
        ClientMessage::UnsubscribeStocks { symbols } => {
            state.rooms.unsubscribe(client_id, &symbols);
            debug!("Client {} unsubscribed from: {:?}", client_id, symbols);
        }
    }
}

/// Send one `stockInit` snapshot per subscribed symbol to the requesting
/// connection only. Unknown symbols are skipped.
fn send_snapshots(state: &AppState, client_id: Uuid, symbols: &[String]) {
    let stocks = match state.store.get_many(symbols) {
        Ok(stocks) => stocks,
        Err(e) => {
            error!("Error fetching initial stock data: {}", e);
            return;
        }
    };

    for stock in stocks {
        let history = match state
            .store
            .history_tail(&stock.symbol, state.config.snapshot_points)
        {
            Ok(history) => history,
            Err(e) => {
                error!("Error fetching history for {}: {}", stock.symbol, e);
                continue;
            }
        };

        let msg = ServerMessage::StockInit {
            data: StockSnapshot {
                symbol: stock.symbol,
                name: stock.name,
                price: stock.price,
                history,
            },
        };
        send_message(state, client_id, &msg);
    }
}

fn send_message(state: &AppState, client_id: Uuid, msg: &ServerMessage) {
    if let Ok(json) = serde_json::to_string(msg) {
        state.rooms.send_to(client_id, &json);
    }
}

fn send_error(state: &AppState, client_id: Uuid, error: &str) {
    let msg = ServerMessage::Error {
        error: error.to_string(),
    };
    send_message(state, client_id, &msg);
}
