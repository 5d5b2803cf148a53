//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! Every connection owns its own `QuizSession`; nothing is shared with the
//! HTTP session store or with other sockets.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::error::SessionError;
use crate::logic;
use crate::protocol::{ClientWsMessage, NextOut, ServerWsMessage};
use crate::session::{QuizConfig, QuizSession};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "nomenquiz", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "nomenquiz", "WebSocket connected");
  let mut session = QuizSession::new();
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "nomenquiz", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut session).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "nomenquiz", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "nomenquiz", phase = ?session.phase(), "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, session))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session: &mut QuizSession) -> ServerWsMessage {
  dispatch(msg, state, session).await.unwrap_or_else(|e| ServerWsMessage::Error { message: e.to_string() })
}

async fn dispatch(msg: ClientWsMessage, state: &AppState, session: &mut QuizSession) -> Result<ServerWsMessage, SessionError> {
  Ok(match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartQuiz { categories, difficulties, count, view } => {
      // Starting again discards whatever this socket was doing.
      let mut fresh = QuizSession::new();
      let total = fresh.configure(&state.bank, QuizConfig { categories, difficulties, count })?;
      *session = fresh;
      let question = logic::question_out(state, session, view)?;
      info!(target: "quiz", total, "WS quiz started");
      ServerWsMessage::QuizStarted { total, question }
    }

    ClientWsMessage::Question { view } => ServerWsMessage::Question { question: logic::question_out(state, session, view)? },

    ClientWsMessage::SubmitAnswer { answer } => {
      let judged = logic::judge(session, &answer)?;
      let explanation = logic::resolve_explanation(state, &judged).await;
      if let Some(e) = &explanation {
        logic::remember_explanation(session, &judged, e);
      }
      info!(target: "quiz", correct = judged.result.correct, "WS submit_answer evaluated");
      ServerWsMessage::AnswerResult { result: logic::answer_out(judged, explanation) }
    }

    ClientWsMessage::Next { view } => match logic::next_out(state, session, view)? {
      NextOut::Question { question } => ServerWsMessage::Question { question },
      NextOut::Completed { results } => ServerWsMessage::Results { results },
    },

    ClientWsMessage::Results => ServerWsMessage::Results { results: logic::results_out(session)? },

    ClientWsMessage::Quit => {
      *session = QuizSession::new();
      info!(target: "quiz", "WS quiz discarded");
      ServerWsMessage::Quit
    }
  })
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::bank::QuestionBank;
  use crate::config::Prompts;
  use crate::domain::{Category, ViewKind};
  use crate::seeds::seed_compounds;

  fn state() -> AppState {
    AppState::with_parts(QuestionBank::new(seed_compounds()), None, Prompts::default(), Duration::from_secs(1))
  }

  fn start(count: usize) -> ClientWsMessage {
    ClientWsMessage::StartQuiz { categories: vec![], difficulties: vec![], count, view: ViewKind::Skeletal }
  }

  #[tokio::test]
  async fn full_quiz_over_one_socket() {
    let st = state();
    let mut s = QuizSession::new();

    match handle_client_ws(start(2), &st, &mut s).await {
      ServerWsMessage::QuizStarted { total, question } => {
        assert_eq!(total, 2);
        assert!(question.rendering.is_some());
      }
      other => panic!("unexpected {:?}", other),
    }

    let name = s.current_question().unwrap().preferred_name().to_string();
    match handle_client_ws(ClientWsMessage::SubmitAnswer { answer: name }, &st, &mut s).await {
      ServerWsMessage::AnswerResult { result } => {
        assert!(result.correct);
        assert!(result.explanation.is_none());
      }
      other => panic!("unexpected {:?}", other),
    }

    assert!(matches!(
      handle_client_ws(ClientWsMessage::Next { view: ViewKind::Condensed }, &st, &mut s).await,
      ServerWsMessage::Question { .. }
    ));
    match handle_client_ws(ClientWsMessage::SubmitAnswer { answer: "nope".into() }, &st, &mut s).await {
      ServerWsMessage::AnswerResult { result } => {
        assert!(!result.correct);
        assert!(result.explanation.is_some());
      }
      other => panic!("unexpected {:?}", other),
    }
    match handle_client_ws(ClientWsMessage::Next { view: ViewKind::Skeletal }, &st, &mut s).await {
      ServerWsMessage::Results { results } => assert_eq!((results.summary.score, results.summary.total), (1, 2)),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[tokio::test]
  async fn errors_are_replies_not_disconnects() {
    let st = AppState::with_parts(
      QuestionBank::new(seed_compounds().into_iter().filter(|c| c.category == Category::Alkane).collect()),
      None,
      Prompts::default(),
      Duration::from_secs(1),
    );
    let mut s = QuizSession::new();
    let msg = ClientWsMessage::StartQuiz { categories: vec![Category::Alkene], difficulties: vec![], count: 5, view: ViewKind::Skeletal };
    match handle_client_ws(msg, &st, &mut s).await {
      ServerWsMessage::Error { message } => assert!(message.contains("broaden")),
      other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(handle_client_ws(ClientWsMessage::Results, &st, &mut s).await, ServerWsMessage::Error { .. }));
    assert!(matches!(handle_client_ws(ClientWsMessage::Ping, &st, &mut s).await, ServerWsMessage::Pong));
  }

  #[tokio::test]
  async fn quit_resets_the_socket_session() {
    let st = state();
    let mut s = QuizSession::new();
    handle_client_ws(start(3), &st, &mut s).await;
    assert!(matches!(handle_client_ws(ClientWsMessage::Quit, &st, &mut s).await, ServerWsMessage::Quit));
    assert_eq!(s.total(), 0);
    assert!(matches!(handle_client_ws(start(1), &st, &mut s).await, ServerWsMessage::QuizStarted { total: 1, .. }));
  }
}
