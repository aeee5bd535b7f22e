//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::aggregate::GroupCount;
use crate::catalog::NameOrder;
use crate::classifier::Prediction;
use crate::domain::{AnimalRecord, QuizQuestion, RawAnimal, NOT_AVAILABLE};
use crate::quiz::{Phase, QuizSession, SubmitOutcome, Verdict};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NewQuestion,
    SubmitChoice {
        choice: String,
    },
    Search {
        name: String,
    },
    IdentifyImage {
        #[serde(rename = "imageBase64")]
        image_base64: String,
        mime: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Question {
        quiz: QuizOut,
    },
    AnswerResult {
        result: AnswerOut,
    },
    SearchResults {
        name: String,
        animals: Vec<AnimalOut>,
    },
    Identification {
        result: IdentifyOut,
    },
    Error {
        message: String,
    },
}

/// Record as sent to clients: source keys plus id, parsed predators and
/// display-ready details.
#[derive(Debug, Serialize)]
pub struct AnimalOut {
    #[serde(rename = "_id")]
    pub id: usize,
    #[serde(flatten)]
    pub raw: RawAnimal,
    #[serde(rename = "predatorList")]
    pub predator_list: Vec<String>,
    pub details: DetailsOut,
}

/// Display-ready fields: `N/A` / `Unknown` defaults and the generated description.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsOut {
    pub scientific_name: String,
    pub habitat: String,
    pub diet: String,
    pub conservation_status: String,
    pub description: String,
}

pub fn animal_out(r: &AnimalRecord) -> AnimalOut {
    let or_na = |v: Option<&str>| v.unwrap_or(NOT_AVAILABLE).to_string();
    AnimalOut {
        id: r.id,
        raw: r.raw.clone(),
        predator_list: r.predators.clone(),
        details: DetailsOut {
            scientific_name: or_na(r.scientific_name()),
            habitat: or_na(r.habitat()),
            diet: or_na(r.diet()),
            conservation_status: r.status_or_unknown().to_string(),
            description: r.description_text(),
        },
    }
}

#[derive(Debug, Serialize)]
pub struct PredatorOut {
    pub name: String,
    pub animal: Option<AnimalOut>,
}

/// Question without its answer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOut {
    pub prompt_text: String,
    pub options: Vec<String>,
    pub attempts_used: u8,
}

impl From<&QuizQuestion> for QuestionOut {
    fn from(q: &QuizQuestion) -> Self {
        Self {
            prompt_text: q.prompt_text.clone(),
            options: q.options.clone(),
            attempts_used: q.attempts_used,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub round: u64,
    pub score: u32,
    pub phase: Phase,
    pub question: Option<QuestionOut>,
}

pub fn quiz_out(session_id: Option<&str>, s: &QuizSession) -> QuizOut {
    QuizOut {
        session_id: session_id.map(str::to_string),
        round: s.round(),
        score: s.score(),
        phase: s.phase(),
        question: s.question().map(QuestionOut::from),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub correct: bool,
    pub retry: bool,
    pub message: String,
    /// Only set once the round is lost.
    pub revealed: Option<String>,
    pub score: u32,
    pub next_question_in_ms: Option<u64>,
}

pub fn answer_out(o: &SubmitOutcome, delay_ms: u64) -> AnswerOut {
    let revealed = match &o.verdict {
        Verdict::Revealed { answer } => Some(answer.clone()),
        _ => None,
    };
    AnswerOut {
        correct: o.verdict == Verdict::Correct,
        retry: o.verdict == Verdict::Retry,
        message: o.verdict.message(),
        revealed,
        score: o.score,
        next_question_in_ms: o.advance.then_some(delay_ms),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyOut {
    pub predictions: Vec<Prediction>,
    pub closest_match: Option<AnimalOut>,
}

#[derive(Debug, Serialize)]
pub struct StatsOut {
    pub total: usize,
    pub status: Vec<GroupCount>,
    pub habitat: Vec<GroupCount>,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub sort: NameOrder,
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: String,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    pub choice: String,
}

#[derive(Deserialize)]
pub struct IdentifyIn {
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
    pub mime: String,
}

#[derive(Deserialize)]
pub struct FavoriteIn {
    pub name: String,
}

#[derive(Serialize)]
pub struct FavoritesOut {
    pub user: String,
    pub favorites: Vec<String>,
}

#[derive(Serialize)]
pub struct FavoriteToggleOut {
    pub name: String,
    pub favorite: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub animals: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outgoing_record_has_no_duplicate_keys() {
        let json = r#"{"Animal":"Lion","_id":"L-01","details":"x","predatorList":"Hyenas","Predators":"Humans"}"#;
        let rec = AnimalRecord::new(7, serde_json::from_str(json).unwrap());
        let text = serde_json::to_string(&animal_out(&rec)).unwrap();

        for key in ["\"_id\"", "\"details\"", "\"predatorList\""] {
            assert_eq!(text.matches(key).count(), 1, "{} in {}", key, text);
        }
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["_id"], 7);
        assert_eq!(v["predatorList"], serde_json::json!(["Humans"]));
        assert_eq!(v["details"]["conservationStatus"], "Unknown");
    }
}
