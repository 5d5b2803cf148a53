//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Difficulty, ViewKind};
use crate::explain::Explanation;
use crate::render::Rendering;
use crate::session::{default_count, Progress, QuizConfig, Summary};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartQuiz {
        #[serde(default)]
        categories: Vec<Category>,
        #[serde(default)]
        difficulties: Vec<Difficulty>,
        #[serde(default = "default_count")]
        count: usize,
        #[serde(default)]
        view: ViewKind,
    },
    Question {
        #[serde(default)]
        view: ViewKind,
    },
    SubmitAnswer {
        answer: String,
    },
    Next {
        #[serde(default)]
        view: ViewKind,
    },
    Results,
    Quit,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    QuizStarted {
        total: usize,
        question: QuestionOut,
    },
    Question {
        question: QuestionOut,
    },
    AnswerResult {
        result: AnswerOut,
    },
    Results {
        results: ResultsOut,
    },
    Quit,
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct OptionOut {
    pub value: String,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CatalogOut {
    pub categories: Vec<OptionOut>,
    pub difficulties: Vec<OptionOut>,
    pub views: Vec<OptionOut>,
    /// Bank size; the most questions a quiz can have.
    pub total: usize,
}

/// Body of `POST /quiz`.
#[derive(Debug, Deserialize)]
pub struct StartQuizIn {
    #[serde(flatten)]
    pub config: QuizConfig,
    #[serde(default)]
    pub view: ViewKind,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: ViewKind,
}

#[derive(Debug, Serialize)]
pub struct StartQuizOut {
    pub session_id: String,
    pub total: usize,
    pub question: QuestionOut,
}

#[derive(Debug, Serialize)]
pub struct RenderingOut {
    pub content_type: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_uri: Option<String>,
}

impl From<&Rendering> for RenderingOut {
    fn from(r: &Rendering) -> Self {
        Self {
            content_type: r.content_type(),
            content: r.as_str().to_string(),
            data_uri: r.data_uri(),
        }
    }
}

/// DTO used by both WS and HTTP for question delivery. Never carries the
/// accepted names.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub compound_id: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub view: ViewKind,
    /// Molecular formula in Hill order, e.g. `C5H12`.
    pub formula: Option<String>,
    pub progress: Progress,
    /// "Problem i of n (Score: s)"
    pub progress_text: String,
    pub answered: bool,
    pub rendering: Option<RenderingOut>,
    /// Reason the question was skipped, if it was.
    pub skipped: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    pub input: String,
    pub matched: Option<String>,
    pub accepted_names: Vec<String>,
    pub feedback: String,
    pub explanation: Option<Explanation>,
    pub progress: Progress,
    pub is_last: bool,
}

#[derive(Debug, Serialize)]
pub struct ExplanationOut {
    pub compound_id: String,
    pub explanation: Option<Explanation>,
}

#[derive(Debug, Serialize)]
pub struct ResultsOut {
    #[serde(flatten)]
    pub summary: Summary,
    pub message: &'static str,
}

impl From<Summary> for ResultsOut {
    fn from(summary: Summary) -> Self {
        let message = summary.tier.message();
        Self { summary, message }
    }
}

/// Reply to `next`: either the following question or the final results.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NextOut {
    Question { question: QuestionOut },
    Completed { results: ResultsOut },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_start_quiz_defaults() {
        let msg: ClientWsMessage = serde_json::from_str(r#"{"type":"start_quiz","categories":["alkene"]}"#).unwrap();
        match msg {
            ClientWsMessage::StartQuiz { categories, difficulties, count, view } => {
                assert_eq!(categories, vec![Category::Alkene]);
                assert!(difficulties.is_empty());
                assert_eq!(count, 5);
                assert_eq!(view, ViewKind::Skeletal);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn ws_unknown_view_is_rejected() {
        assert!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"question","view":"3d"}"#).is_err());
    }

    #[test]
    fn start_body_flattens_config() {
        let body: StartQuizIn =
            serde_json::from_str(r#"{"difficulties":["difficult"],"count":3,"view":"full"}"#).unwrap();
        assert_eq!(body.config.difficulties, vec![Difficulty::Hard]);
        assert_eq!(body.config.count, 3);
        assert_eq!(body.view, ViewKind::Full);
    }

    #[test]
    fn server_messages_are_tagged() {
        let v = serde_json::to_value(ServerWsMessage::Error { message: "x".into() }).unwrap();
        assert_eq!(v["type"], "error");
        let v = serde_json::to_value(ServerWsMessage::Pong).unwrap();
        assert_eq!(v["type"], "pong");
    }
}
