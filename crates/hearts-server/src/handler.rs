//! Per-connection session router.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task. The flow is:
//!   1. Create the connection's outbound channel and start the writer,
//!      which encodes every [`RoomEvent`] pushed to it and sends the frame.
//!   2. Loop: receive frames → decode a [`ClientEvent`] → route it to the
//!      room store or the caller's room actor.
//!   3. A rejected request produces an `error` event for this connection
//!      only. Broadcasts are the room actors' job.
//!   4. On close, or when nothing at all (not even a ping or heartbeat)
//!      arrives within the idle timeout, the connection is unseated and the
//!      rest of its table gets `playerLeft`.

use std::sync::Arc;

use hearts_protocol::{ClientEvent, Codec, ConnectionId};
use hearts_room::{MemberSender, RoomError, RoomEvent};
use hearts_transport::{Connection, Frame, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ServerError;
use crate::server::ServerState;

/// Drop guard that unseats the connection when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct SeatGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SeatGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut rooms = state.rooms.lock().await;
            match rooms.remove_player(conn_id).await {
                Ok(Some(departure)) if departure.left() => {
                    tracing::info!(%conn_id, remaining = departure.remaining, "player disconnected");
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(%conn_id, error = %e, "cleanup failed"),
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let (outbound, inbox) = mpsc::unbounded_channel();
    tokio::spawn(write_events(conn.clone(), inbox, Arc::clone(&state)));

    let _guard = SeatGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    loop {
        // Every frame restarts the clock, keep-alives included.
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(Frame::Data(data)))) => data,
            Ok(Ok(Some(Frame::KeepAlive))) => continue,
            Ok(Ok(None)) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection timed out");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to decode event");
                let _ = outbound.send(RoomEvent::error(format!("invalid message: {e}")));
                continue;
            }
        };

        tracing::debug!(%conn_id, ?event, "received");

        if let Err(e) = route(&state, conn_id, event, &outbound).await {
            tracing::debug!(%conn_id, error = %e, "request rejected");
            let _ = outbound.send(RoomEvent::error(e.to_string()));
        }
    }

    let _ = conn.close().await;
    // _guard drops here → the seat is released.
    Ok(())
}

/// Routes one client event.
///
/// Lobby operations go through the store (they change its indexes).
/// In-game operations only look up the caller's room, release the store
/// lock, and then talk to that room's actor.
async fn route<C: Codec>(
    state: &ServerState<C>,
    conn_id: ConnectionId,
    event: ClientEvent,
    outbound: &MemberSender,
) -> Result<(), RoomError> {
    match event {
        ClientEvent::CreateRoom { player_name } => {
            let room = state
                .rooms
                .lock()
                .await
                .create_room(conn_id, &player_name, outbound.clone())?;
            tracing::info!(%conn_id, code = %room.code, "created room");
        }

        ClientEvent::JoinRoom {
            room_code,
            player_name,
        } => {
            let mut rooms = state.rooms.lock().await;
            rooms
                .join_room(&room_code, conn_id, &player_name, outbound.clone())
                .await?;
        }

        ClientEvent::GetRoomData {
            room_code,
            player_name,
        } => {
            let mut rooms = state.rooms.lock().await;
            rooms
                .get_room_data(&room_code, conn_id, player_name, outbound.clone())
                .await?;
        }

        ClientEvent::SetReady { is_ready } => {
            let handle = state.rooms.lock().await.handle_for(conn_id)?;
            handle.set_ready(conn_id, is_ready).await?;
        }

        ClientEvent::PassCards { card_ids } => {
            let handle = state.rooms.lock().await.handle_for(conn_id)?;
            handle.pass_cards(conn_id, card_ids).await?;
        }

        ClientEvent::PlayCard { card_id } => {
            let handle = state.rooms.lock().await.handle_for(conn_id)?;
            handle.play_card(conn_id, card_id).await?;
        }

        ClientEvent::UpdateEndPoint { end_point } => {
            let handle = state.rooms.lock().await.handle_for(conn_id)?;
            handle.update_end_point(conn_id, end_point).await?;
        }

        ClientEvent::Heartbeat { client_time } => {
            let _ = outbound.send(RoomEvent::heartbeat_ack(client_time));
        }
    }

    Ok(())
}

/// Writer task: encodes outbound events and sends them as text frames,
/// in the order they were queued.
///
/// Ends when every sender is gone (the connection left its room and the
/// handler exited) or the socket stops accepting frames.
async fn write_events<C: Codec>(
    conn: WebSocketConnection,
    mut inbox: mpsc::UnboundedReceiver<RoomEvent>,
    state: Arc<ServerState<C>>,
) {
    let conn_id = conn.id();
    while let Some(event) = inbox.recv().await {
        let frame = match state.codec.encode(&event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(%conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
