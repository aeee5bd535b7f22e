//! Error types for the dataset engine and its collaborators.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Animal not found: id {0}")]
  NotFound(usize),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuizError {
  #[error("Quiz needs at least 3 distinct animals, dataset has {distinct}")]
  InsufficientData { distinct: usize },

  #[error("No active question in this quiz session")]
  NoActiveQuestion,
}

#[derive(Error, Debug)]
pub enum ProviderError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Unexpected HTTP status {0}")]
  Status(u16),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("Unsupported dataset file type: {0}")]
  UnsupportedFileType(String),
}

#[derive(Error, Debug)]
pub enum ClassifierError {
  #[error("Image classifier disabled (no CLASSIFIER_URL)")]
  Disabled,

  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Classifier returned HTTP {status}: {body}")]
  Status { status: u16, body: String },

  #[error("Invalid image payload: {0}")]
  Decode(String),
}
