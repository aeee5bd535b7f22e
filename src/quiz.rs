//! Conservation-status quiz: question generation and per-round attempt tracking.
//!
//! Flow:
//! 1) Pick one record uniformly at random; its status drives the prompt.
//! 2) Pick two other distinct names uniformly without replacement.
//! 3) Shuffle the three options (Fisher–Yates).
//! 4) The player gets two tries; after the round resolves the session advances
//!    to a fresh question once the configured delay has elapsed.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::QuizConfig;
use crate::domain::{AnimalRecord, QuizQuestion};
use crate::error::QuizError;
use crate::store::RecordStore;
use crate::util::fill_template;

pub const OPTION_COUNT: usize = 3;
pub const UNDEFINED_STATUS: &str = "status not defined.";

/// Built-in status -> explanation table.
pub const STATUS_EXPLANATIONS: &[(&str, &str)] = &[
  ("Least Concern", "species are widespread and abundant — they face no major threats."),
  ("Near Threatened", "species may soon become vulnerable if threats continue."),
  ("Vulnerable", "species face a high risk of extinction in the wild."),
  ("Endangered", "species are at a very high risk of extinction — serious danger."),
  ("Critically Endangered", "species face an extremely high risk of extinction — almost gone."),
  ("Extinct", "species no longer exist anywhere in the world."),
  ("Unknown", "the conservation status is not recorded or evaluated."),
];

/// Config overrides first, then the built-in table, then the generic fallback.
pub fn explain_status<'a>(cfg: &'a QuizConfig, status: &str) -> &'a str {
  if let Some(text) = cfg.explanations.get(status) {
    return text;
  }
  STATUS_EXPLANATIONS
    .iter()
    .find(|(s, _)| *s == status)
    .map(|(_, e)| *e)
    .unwrap_or(UNDEFINED_STATUS)
}

pub fn prompt_for(cfg: &QuizConfig, record: &AnimalRecord) -> String {
  let status = record.status_or_unknown();
  fill_template(
    &cfg.prompt_template,
    &[("status", status), ("explanation", explain_status(cfg, status))],
  )
}

/// Build one question. Refuses stores with fewer than three distinct names.
#[instrument(level = "debug", skip_all, fields(store_len = store.len()))]
pub fn generate<R: Rng + ?Sized>(
  store: &RecordStore,
  cfg: &QuizConfig,
  rng: &mut R,
) -> Result<QuizQuestion, QuizError> {
  let names = store.distinct_names();
  if names.len() < OPTION_COUNT {
    return Err(QuizError::InsufficientData { distinct: names.len() });
  }

  let candidates: Vec<&AnimalRecord> = store.all().iter().filter(|r| !r.name().is_empty()).collect();
  let correct = *candidates
    .choose(rng)
    .ok_or(QuizError::InsufficientData { distinct: 0 })?;

  let pool: Vec<&str> = names.into_iter().filter(|n| *n != correct.name()).collect();
  let mut options: Vec<String> = pool
    .choose_multiple(rng, OPTION_COUNT - 1)
    .map(|n| n.to_string())
    .collect();
  options.push(correct.name().to_string());
  options.shuffle(rng);

  debug!(target: "quiz", answer = %correct.name(), status = %correct.status_or_unknown(), "Question generated");
  Ok(QuizQuestion {
    prompt_text: prompt_for(cfg, correct),
    correct_answer: correct.name().to_string(),
    options,
    attempts_used: 0,
  })
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
  Idle,
  Active,
  Resolved { correct: bool },
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
  Correct,
  Retry,
  Revealed { answer: String },
}

impl Verdict {
  pub fn message(&self) -> String {
    match self {
      Verdict::Correct => "Correct!".into(),
      Verdict::Retry => "Wrong! Try again.".into(),
      Verdict::Revealed { answer } => format!("Wrong! The correct answer was: {}", answer),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
  pub verdict: Verdict,
  pub score: u32,
  /// Round that was just played; pass back to `advance_round` once the delay fires.
  pub round: u64,
  pub advance: bool,
}

/// One player's quiz: the current question, its attempt count and the score.
#[derive(Clone, Debug)]
pub struct QuizSession {
  question: Option<QuizQuestion>,
  phase: Phase,
  score: u32,
  round: u64,
}

impl Default for QuizSession {
  fn default() -> Self {
    Self { question: None, phase: Phase::Idle, score: 0, round: 0 }
  }
}

impl QuizSession {
  pub fn new() -> Self { Self::default() }

  pub fn question(&self) -> Option<&QuizQuestion> { self.question.as_ref() }
  pub fn phase(&self) -> Phase { self.phase }
  pub fn score(&self) -> u32 { self.score }
  pub fn round(&self) -> u64 { self.round }

  /// Replace the current question with a fresh one. On failure the session
  /// goes back to `Idle` with no question.
  pub fn next_round<R: Rng + ?Sized>(
    &mut self,
    store: &RecordStore,
    cfg: &QuizConfig,
    rng: &mut R,
  ) -> Result<&QuizQuestion, QuizError> {
    match generate(store, cfg, rng) {
      Ok(q) => {
        self.round += 1;
        self.phase = Phase::Active;
        Ok(&*self.question.insert(q))
      }
      Err(e) => {
        self.question = None;
        self.phase = Phase::Idle;
        Err(e)
      }
    }
  }

  /// Scheduled advance. Ignored unless `round` is still the current round and
  /// that round has been resolved.
  pub fn advance_round<R: Rng + ?Sized>(
    &mut self,
    round: u64,
    store: &RecordStore,
    cfg: &QuizConfig,
    rng: &mut R,
  ) -> Option<Result<&QuizQuestion, QuizError>> {
    if round != self.round || !matches!(self.phase, Phase::Resolved { .. }) {
      debug!(target: "quiz", stale = round, current = self.round, "Skipping stale advance");
      return None;
    }
    Some(self.next_round(store, cfg, rng))
  }

  pub fn submit(&mut self, choice: &str) -> Result<SubmitOutcome, QuizError> {
    if self.phase != Phase::Active {
      return Err(QuizError::NoActiveQuestion);
    }
    let q = self.question.as_mut().ok_or(QuizError::NoActiveQuestion)?;

    let verdict = if choice == q.correct_answer {
      self.score += 1;
      self.phase = Phase::Resolved { correct: true };
      Verdict::Correct
    } else if q.attempts_used == 0 {
      q.attempts_used = 1;
      Verdict::Retry
    } else {
      self.phase = Phase::Resolved { correct: false };
      Verdict::Revealed { answer: q.correct_answer.clone() }
    };

    let advance = verdict != Verdict::Retry;
    info!(target: "quiz", round = self.round, score = self.score, ?verdict, "Answer submitted");
    Ok(SubmitOutcome { verdict, score: self.score, round: self.round, advance })
  }
}
