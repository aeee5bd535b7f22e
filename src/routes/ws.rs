//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! Every connection owns one quiz session. A resolved round arms the advance
//! timer; the loop waits on the socket and the timer together, and when the
//! socket goes away the timer is dropped with it.

use std::{pin::Pin, sync::Arc};
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::time::{sleep, Sleep};
use tracing::{info, error, instrument, debug};

use crate::logic::*;
use crate::protocol::{answer_out, quiz_out, ClientWsMessage, ServerWsMessage};
use crate::quiz::QuizSession;
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Per-connection quiz state plus the armed advance timer (round, deadline).
#[derive(Default)]
struct WsQuiz {
  session: QuizSession,
  advance: Option<(u64, Pin<Box<Sleep>>)>,
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "biotrack_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "biotrack_backend", "WebSocket connected");
  let mut quiz = WsQuiz::default();

  loop {
    let reply_msg = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => {
          // Parse, dispatch, serialize response.
          match serde_json::from_str::<ClientWsMessage>(&txt) {
            Ok(incoming) => {
              debug!(target: "biotrack_backend", msg = %trunc_for_log(&format!("{:?}", incoming), 160), "WS received");
              handle_client_ws(incoming, &state, &mut quiz).await
            }
            Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
          }
        }
        Some(Ok(Message::Ping(payload))) => { let _ = socket.send(Message::Pong(payload)).await; continue; }
        Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
        Some(Ok(_)) => continue,
      },
      round = advance_due(&mut quiz.advance) => match fire_advance(&state, &mut quiz.session, round) {
        Some(msg) => msg,
        None => continue,
      },
    };

    let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });

    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "biotrack_backend", error = %e, "WS send error");
      break;
    }
  }
  info!(target: "biotrack_backend", score = quiz.session.score(), "WebSocket disconnected");
}

/// Resolves with the armed round once its deadline passes; pends forever when unarmed.
async fn advance_due(advance: &mut Option<(u64, Pin<Box<Sleep>>)>) -> u64 {
  match advance {
    Some((round, deadline)) => {
      deadline.as_mut().await;
      let round = *round;
      *advance = None;
      round
    }
    None => std::future::pending().await,
  }
}

fn fire_advance(state: &AppState, session: &mut QuizSession, round: u64) -> Option<ServerWsMessage> {
  let posed = session
    .advance_round(round, &state.store, &state.config.quiz, &mut rand::thread_rng())?
    .map(|_| ());
  let msg = match posed {
    Ok(()) => ServerWsMessage::Question { quiz: quiz_out(None, session) },
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  };
  Some(msg)
}

#[instrument(level = "info", skip(msg, state, quiz))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, quiz: &mut WsQuiz) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewQuestion => {
      quiz.advance = None;
      let posed = quiz
        .session
        .next_round(&state.store, &state.config.quiz, &mut rand::thread_rng())
        .map(|_| ());
      match posed {
        Ok(()) => {
          info!(target: "quiz", round = quiz.session.round(), "WS question served");
          ServerWsMessage::Question { quiz: quiz_out(None, &quiz.session) }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::SubmitChoice { choice } => match quiz.session.submit(&choice) {
      Ok(outcome) => {
        let delay = state.config.quiz.advance_delay();
        if outcome.advance {
          quiz.advance = Some((outcome.round, Box::pin(sleep(delay))));
        }
        info!(target: "quiz", verdict = ?outcome.verdict, score = outcome.score, "WS submit_choice evaluated");
        ServerWsMessage::AnswerResult { result: answer_out(&outcome, state.config.quiz.advance_delay_ms) }
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::Search { name } => {
      let animals = search_animals(state, &name);
      ServerWsMessage::SearchResults { name, animals }
    }

    ClientWsMessage::IdentifyImage { image_base64, mime } => {
      match identify_image(state, &image_base64, &mime).await {
        Ok(result) => ServerWsMessage::Identification { result },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::config::{AppConfig, QuizConfig};
  use crate::quiz::Phase;
  use crate::seeds::seed_animals;
  use crate::store::RecordStore;

  fn state(delay_ms: u64) -> AppState {
    let mut config = AppConfig::default();
    config.quiz = QuizConfig { advance_delay_ms: delay_ms, ..QuizConfig::default() };
    AppState::new(RecordStore::load(seed_animals()), config, None)
  }

  /// Pose a question and answer it correctly, which arms the advance timer.
  async fn resolved_round(st: &AppState, quiz: &mut WsQuiz) -> u64 {
    let reply = handle_client_ws(ClientWsMessage::NewQuestion, st, quiz).await;
    assert!(matches!(reply, ServerWsMessage::Question { .. }));
    let choice = quiz.session.question().unwrap().correct_answer.clone();
    let reply = handle_client_ws(ClientWsMessage::SubmitChoice { choice }, st, quiz).await;
    assert!(matches!(reply, ServerWsMessage::AnswerResult { ref result } if result.correct));
    quiz.session.round()
  }

  #[tokio::test]
  async fn armed_timer_poses_next_question() {
    let st = state(20);
    let mut quiz = WsQuiz::default();
    let round = resolved_round(&st, &mut quiz).await;
    assert!(quiz.advance.is_some());

    let due = tokio::time::timeout(Duration::from_secs(1), advance_due(&mut quiz.advance))
      .await
      .unwrap();
    assert_eq!(due, round);
    assert!(quiz.advance.is_none());

    match fire_advance(&st, &mut quiz.session, due) {
      Some(ServerWsMessage::Question { quiz: out }) => {
        assert_eq!(out.round, round + 1);
        assert_eq!(out.score, 1);
        assert_eq!(out.question.unwrap().options.len(), 3);
      }
      _ => panic!("expected a new question"),
    }
    assert_eq!(quiz.session.phase(), Phase::Active);
  }

  #[tokio::test]
  async fn new_question_disarms_pending_advance() {
    let st = state(20);
    let mut quiz = WsQuiz::default();
    let stale = resolved_round(&st, &mut quiz).await;

    handle_client_ws(ClientWsMessage::NewQuestion, &st, &mut quiz).await;
    assert!(quiz.advance.is_none());
    assert!(fire_advance(&st, &mut quiz.session, stale).is_none());
    assert_eq!(quiz.session.round(), stale + 1);
  }

  #[tokio::test]
  async fn unarmed_timer_never_fires() {
    let mut advance = None;
    let waited = tokio::time::timeout(Duration::from_millis(50), advance_due(&mut advance)).await;
    assert!(waited.is_err());
  }

  #[tokio::test]
  async fn losing_the_race_keeps_the_timer_armed() {
    let st = state(200);
    let mut quiz = WsQuiz::default();
    let round = resolved_round(&st, &mut quiz).await;

    // Another select branch winning drops the future but not the deadline.
    let early = tokio::time::timeout(Duration::from_millis(10), advance_due(&mut quiz.advance)).await;
    assert!(early.is_err());
    assert!(quiz.advance.is_some());

    let due = tokio::time::timeout(Duration::from_secs(2), advance_due(&mut quiz.advance))
      .await
      .unwrap();
    assert_eq!(due, round);
  }
}
