//! Connection handler
//!
//! Runs one session from accept to teardown: registry membership, the read
//! loop, the write loop, and the idle watchdog.

use crate::connection::{Liveness, Mailbox, Session, Watchdog};
use crate::protocol::{write_line, LineReader};
use crate::server::GatewayState;
use chat_core::{notices, BroadcastMessage};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Peer closed its side
    PeerClosed,
    /// Unrecoverable read error
    ReadFailed,
    /// Write loop stopped on a write error
    WriteFailed,
    /// Watchdog fired
    IdleTimeout,
    /// Address already registered, never joined
    Rejected,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PeerClosed => "peer_closed",
            Self::ReadFailed => "read_failed",
            Self::WriteFailed => "write_failed",
            Self::IdleTimeout => "idle_timeout",
            Self::Rejected => "rejected",
        })
    }
}

/// Handle an accepted transport until its session ends
///
/// `peer` becomes both the session's address and its initial name.
pub async fn handle_connection<T>(state: GatewayState, transport: T, peer: String) -> EndReason
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    let config = state.session_config();
    let (session, mailbox) = Session::new(peer, config.mailbox_capacity, state.delivery_policy());
    let (reader, mut writer) = tokio::io::split(transport);

    if let Err(e) = state.registry().add(Arc::clone(&session)) {
        // Refuse rather than shadow the registered session
        tracing::warn!(addr = %session.addr(), error = %e, "Session rejected");
        if let Err(e) = write_line(&mut writer, notices::ADDRESS_IN_USE).await {
            tracing::debug!(addr = %session.addr(), error = %e, "Rejection notice not written");
        }
        let _ = writer.shutdown().await;
        return EndReason::Rejected;
    }

    tracing::info!(session_id = %session.id(), addr = %session.addr(), "Session joined");

    let mut write_task = tokio::spawn(write_loop(Arc::clone(&session), mailbox, writer));
    let mut writer_done = false;

    state.broadcaster().publish(BroadcastMessage::new(
        session.addr(),
        session.name(),
        notices::JOINED,
    ));

    let (watchdog, liveness) = Watchdog::new(config.idle_timeout());

    let reason = tokio::select! {
        reason = read_loop(&state, &session, reader, liveness) => reason,
        () = watchdog.expired() => {
            tracing::info!(
                session_id = %session.id(),
                name = %session.name(),
                idle_secs = config.idle_timeout_secs,
                "Session idle, evicting"
            );
            if let Err(e) = session.deliver(notices::EVICTED_IDLE).await {
                tracing::debug!(session_id = %session.id(), error = %e, "Eviction notice dropped");
            }
            EndReason::IdleTimeout
        }
        _ = &mut write_task => {
            writer_done = true;
            EndReason::WriteFailed
        }
    };

    teardown(&state, &session, write_task, writer_done, reason).await;

    reason
}

/// Feed complete lines to the router until the peer goes away
async fn read_loop<T>(
    state: &GatewayState,
    session: &Arc<Session>,
    reader: ReadHalf<T>,
    liveness: Liveness,
) -> EndReason
where
    T: AsyncRead,
{
    let mut lines = LineReader::new(reader, state.session_config().max_line_bytes);

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                liveness.signal();

                if line.is_empty() {
                    continue;
                }

                state.router().dispatch(session, &line).await;
            }
            Ok(None) => {
                tracing::debug!(session_id = %session.id(), "Peer closed connection");
                return EndReason::PeerClosed;
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "Read failed");
                return EndReason::ReadFailed;
            }
        }
    }
}

/// Drain the mailbox to the transport, then shut the write side down
async fn write_loop<T>(session: Arc<Session>, mut mailbox: Mailbox, mut writer: WriteHalf<T>)
where
    T: AsyncWrite,
{
    while let Some(line) = mailbox.recv().await {
        if let Err(e) = write_line(&mut writer, &line).await {
            tracing::warn!(session_id = %session.id(), error = %e, "Write failed");
            return;
        }
    }

    let _ = writer.shutdown().await;
}

/// Close, unregister, announce, and wait for the writer to flush
async fn teardown(
    state: &GatewayState,
    session: &Session,
    mut write_task: JoinHandle<()>,
    writer_done: bool,
    reason: EndReason,
) {
    session.close();

    if state.registry().remove_session(session) {
        state.broadcaster().publish(BroadcastMessage::new(
            session.addr(),
            session.name(),
            notices::LEFT,
        ));
    }

    if !writer_done {
        let grace = state.session_config().writer_grace();
        if tokio::time::timeout(grace, &mut write_task).await.is_err() {
            tracing::warn!(session_id = %session.id(), "Write loop did not finish, aborting");
            write_task.abort();
        }
    }

    let connected_for = Utc::now() - session.connected_at();

    tracing::info!(
        session_id = %session.id(),
        name = %session.name(),
        reason = %reason,
        connected_secs = connected_for.num_seconds(),
        "Session left"
    );
}
