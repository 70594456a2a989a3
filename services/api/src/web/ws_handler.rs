//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection owns one `LotterySession`; client messages and fetch results
//! are applied to it one at a time, in arrival order.

use crate::web::{
    fetch_task::{fetch_process, FetchCompleted},
    protocol::{ClientMessage, EntryView, SegmentView, ServerMessage},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use comment_lottery_core::{
    Completion, FetchTicket, LotteryError, LotterySession, RandomSource, RequestState, SpinError,
    SpinOutcome, Submission,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    info!(%session_id, "New WebSocket connection established.");

    let (mut ws_sender, mut receiver) = socket.split();
    if !send_message(&mut ws_sender, &ServerMessage::SessionInitialized { session_id }).await {
        error!("Failed to send session initialized message.");
        return;
    }

    let mut session = LotterySession::new();
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchCompleted>();

    // --- Main Event Loop ---
    'connection: loop {
        let replies = tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        let (replies, ticket) = handle_client_message(&mut session, client_msg);
                        if let Some(ticket) = ticket {
                            tokio::spawn(fetch_process(app_state.clone(), ticket, fetch_tx.clone()));
                        }
                        replies
                    }
                    Err(e) => {
                        warn!("Failed to deserialize client message: {}", e);
                        Vec::new()
                    }
                },
                Some(Ok(Message::Close(_))) => {
                    info!("Client sent close message.");
                    break;
                }
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                None => {
                    info!("Client disconnected.");
                    break;
                }
            },
            Some(completed) = fetch_rx.recv() => handle_fetch_completed(&mut session, completed),
        };

        for reply in &replies {
            if !send_message(&mut ws_sender, reply).await {
                error!("Failed to send message to client. Closing connection.");
                break 'connection;
            }
        }
    }

    info!(%session_id, "WebSocket connection closed.");
}

async fn send_message(
    ws_sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => ws_sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            false
        }
    }
}

/// Applies one client message to the session.
///
/// Returns the replies for the client and, when the message started a request,
/// the ticket of the single fetch the caller must now run.
pub fn handle_client_message<S: RandomSource>(
    session: &mut LotterySession<S>,
    client_msg: ClientMessage,
) -> (Vec<ServerMessage>, Option<FetchTicket>) {
    match client_msg {
        ClientMessage::Submit { link } => match session.submit(&link) {
            Submission::Rejected(_) => (
                vec![ServerMessage::LinkRejected {
                    message: "Please enter a valid YouTube link.".to_string(),
                }],
                None,
            ),
            Submission::Ignored => {
                info!("Submit received while loading; ignored.");
                (Vec::new(), None)
            }
            Submission::Failed(e) => (vec![ServerMessage::from(&LotteryError::from(e))], None),
            Submission::Fetch(ticket) => (
                vec![ServerMessage::RequestState {
                    state: session.request_state().name().to_string(),
                }],
                Some(ticket),
            ),
        },
        ClientMessage::Reset => {
            session.reset();
            (
                vec![ServerMessage::RequestState {
                    state: session.request_state().name().to_string(),
                }],
                None,
            )
        }
        ClientMessage::Spin => {
            let replies = match session.spin() {
                Ok(SpinOutcome::Started(start)) => vec![ServerMessage::SpinStarted {
                    segments: start.segments.into_iter().map(SegmentView::from).collect(),
                    target_index: start.target_index,
                }],
                Ok(SpinOutcome::Ignored) => Vec::new(),
                Err(e) => vec![invalid_action(e)],
            };
            (replies, None)
        }
        ClientMessage::AnimationComplete => {
            let reply = match session.animation_complete() {
                Ok(winner) => ServerMessage::from(winner),
                Err(e) => invalid_action(e),
            };
            (vec![reply], None)
        }
        ClientMessage::DismissWinner => {
            let reply = match session.dismiss_winner() {
                Ok(()) => ServerMessage::WinnerDismissed,
                Err(e) => invalid_action(e),
            };
            (vec![reply], None)
        }
    }
}

/// Applies a fetch report to the session; stale reports produce no replies.
pub fn handle_fetch_completed<S: RandomSource>(
    session: &mut LotterySession<S>,
    completed: FetchCompleted,
) -> Vec<ServerMessage> {
    if session.complete(completed.generation, completed.result) == Completion::Stale {
        return Vec::new();
    }

    match session.request_state() {
        RequestState::Ready(pool) if pool.is_empty() => {
            vec![ServerMessage::NoEligibleParticipants]
        }
        RequestState::Ready(pool) => vec![ServerMessage::Ready {
            participants: pool.len(),
            entries: pool.iter().map(EntryView::from).collect(),
        }],
        RequestState::Error(e) => vec![ServerMessage::from(e)],
        other => {
            error!(state = other.name(), "Applied fetch left the request in an unexpected state.");
            Vec::new()
        }
    }
}

/// Maps a rejected lottery action to its reply; the core has already logged it.
fn invalid_action(e: SpinError) -> ServerMessage {
    ServerMessage::Error {
        kind: "invalid_action".to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comment_lottery_core::{CommentEntry, CommentPool, FetchError, SelectionEngine};

    /// Always draws the same index.
    struct Fixed(usize);

    impl RandomSource for Fixed {
        fn index_below(&mut self, upper: usize) -> usize {
            self.0 % upper
        }
    }

    fn session(index: usize) -> LotterySession<Fixed> {
        LotterySession::with_engine(SelectionEngine::new(Fixed(index)))
    }

    fn pool(authors: &[&str]) -> CommentPool {
        CommentPool::new(
            authors
                .iter()
                .map(|a| CommentEntry {
                    author: a.to_string(),
                    text: format!("{a} was here"),
                    avatar_url: Some(format!("https://yt3.example/{a}")),
                })
                .collect(),
        )
    }

    fn submit(session: &mut LotterySession<Fixed>, link: &str) -> (Vec<ServerMessage>, Option<FetchTicket>) {
        handle_client_message(
            session,
            ClientMessage::Submit {
                link: link.to_string(),
            },
        )
    }

    #[test]
    fn full_round_from_link_to_winner() {
        let mut session = session(1);

        let (replies, ticket) = submit(&mut session, "https://youtu.be/dQw4w9WgXcQ");
        let ticket = ticket.expect("a fetch should be issued");
        assert_eq!(
            replies,
            vec![ServerMessage::RequestState {
                state: "loading".to_string()
            }]
        );

        let replies = handle_fetch_completed(
            &mut session,
            FetchCompleted {
                generation: ticket.generation,
                result: Ok(pool(&["A", "B"])),
            },
        );
        assert!(matches!(&replies[..], [ServerMessage::Ready { participants: 2, .. }]));

        let (replies, _) = handle_client_message(&mut session, ClientMessage::Spin);
        let [ServerMessage::SpinStarted { segments, target_index }] = &replies[..] else {
            panic!("expected a spin start, got {replies:?}");
        };
        assert_eq!(*target_index, 1);
        assert_eq!(segments[1].label, "B");
        assert_eq!(segments[1].color_index, 1);

        // Spamming spin mid-animation changes nothing.
        let (replies, _) = handle_client_message(&mut session, ClientMessage::Spin);
        assert!(replies.is_empty());

        let (replies, _) = handle_client_message(&mut session, ClientMessage::AnimationComplete);
        let [ServerMessage::WinnerDrawn { author, target_index, avatar_url, .. }] = &replies[..] else {
            panic!("expected a winner, got {replies:?}");
        };
        assert_eq!(author, "B");
        assert_eq!(*target_index, 1);
        assert_eq!(avatar_url.as_deref(), Some("https://yt3.example/B"));

        let (replies, _) = handle_client_message(&mut session, ClientMessage::DismissWinner);
        assert_eq!(replies, vec![ServerMessage::WinnerDismissed]);
    }

    #[test]
    fn rejected_link_issues_no_fetch() {
        let mut session = session(0);
        let (replies, ticket) = submit(&mut session, "https://example.com/video");
        assert!(ticket.is_none());
        assert!(matches!(&replies[..], [ServerMessage::LinkRejected { .. }]));
        assert_eq!(session.request_state(), &RequestState::Idle);
    }

    #[test]
    fn resubmitting_while_loading_is_silent() {
        let mut session = session(0);
        let (_, first) = submit(&mut session, "https://youtu.be/dQw4w9WgXcQ");
        assert!(first.is_some());
        let (replies, second) = submit(&mut session, "https://youtu.be/dQw4w9WgXcQ");
        assert!(replies.is_empty());
        assert!(second.is_none());
    }

    #[test]
    fn empty_pool_reports_no_eligible_participants() {
        let mut session = session(0);
        let (_, ticket) = submit(&mut session, "https://youtu.be/dQw4w9WgXcQ");
        let replies = handle_fetch_completed(
            &mut session,
            FetchCompleted {
                generation: ticket.unwrap().generation,
                result: Ok(pool(&[])),
            },
        );
        assert_eq!(replies, vec![ServerMessage::NoEligibleParticipants]);

        let (replies, _) = handle_client_message(&mut session, ClientMessage::Spin);
        assert!(matches!(&replies[..], [ServerMessage::Error { kind, .. }] if kind == "invalid_action"));
    }

    #[test]
    fn fetch_failure_is_reported_with_its_kind() {
        let mut session = session(0);
        let (_, ticket) = submit(&mut session, "https://youtu.be/dQw4w9WgXcQ");
        let replies = handle_fetch_completed(
            &mut session,
            FetchCompleted {
                generation: ticket.unwrap().generation,
                result: Err(FetchError::NoComments),
            },
        );
        assert!(matches!(&replies[..], [ServerMessage::Error { kind, .. }] if kind == "no_comments"));
    }

    #[test]
    fn stale_report_after_reset_is_dropped() {
        let mut session = session(0);
        let (_, ticket) = submit(&mut session, "https://youtu.be/dQw4w9WgXcQ");
        let (replies, _) = handle_client_message(&mut session, ClientMessage::Reset);
        assert_eq!(
            replies,
            vec![ServerMessage::RequestState {
                state: "idle".to_string()
            }]
        );

        let replies = handle_fetch_completed(
            &mut session,
            FetchCompleted {
                generation: ticket.unwrap().generation,
                result: Ok(pool(&["late"])),
            },
        );
        assert!(replies.is_empty());
        assert_eq!(session.request_state(), &RequestState::Idle);
    }
}
