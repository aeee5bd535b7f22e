//! Minimal client for the external image classifier.
//!
//! The classifier receives the image as a multipart upload (`file` part) and
//! answers with a JSON array of `{label, confidence}`. We keep the top three,
//! clamp confidences into [0, 1], rank them and humanize the labels.
//!
//! NOTE: image bytes are never logged, only their size and mime type.

use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::util::{title_case, trunc_for_log};

pub const TOP_K: usize = 3;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Prediction {
  pub label: String,
  pub confidence: f32,
}

#[derive(Clone)]
pub struct Classifier {
  pub client: reqwest::Client,
  pub url: String,
  pub timeout: Duration,
}

impl Classifier {
  /// Construct the client if we find CLASSIFIER_URL; otherwise return None.
  pub fn from_env(cfg: &ClassifierConfig) -> Option<Self> {
    let url = std::env::var("CLASSIFIER_URL").ok()?;
    Self::new(url, cfg).ok()
  }

  pub fn new(url: impl Into<String>, cfg: &ClassifierConfig) -> Result<Self, ClassifierError> {
    let timeout = cfg.timeout();
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client, url: url.into(), timeout })
  }

  #[instrument(level = "info", skip(self, image), fields(image_len = image.len(), %mime))]
  pub async fn classify(&self, image: Vec<u8>, mime: &str) -> Result<Vec<Prediction>, ClassifierError> {
    let part = Part::bytes(image)
      .file_name("upload")
      .mime_str(mime)?;
    let form = Form::new().part("file", part);

    let started = std::time::Instant::now();
    let res = self
      .client
      .post(&self.url)
      .header(USER_AGENT, "biotrack-backend/0.1")
      .multipart(form)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      return Err(ClassifierError::Status { status, body: trunc_for_log(&body, 200) });
    }

    let raw: Vec<Prediction> = res.json().await?;
    let ranked = rank_predictions(raw);
    info!(target: "biotrack_backend", elapsed_ms = started.elapsed().as_millis() as u64, top = ?ranked.first().map(|p| &p.label), "Classifier answered");
    Ok(ranked)
  }
}

/// Humanize, clamp, sort descending by confidence and keep the top three.
pub fn rank_predictions(raw: Vec<Prediction>) -> Vec<Prediction> {
  let mut out: Vec<Prediction> = raw
    .into_iter()
    .map(|p| Prediction {
      label: title_case(&p.label),
      confidence: if p.confidence.is_nan() { 0.0 } else { p.confidence.clamp(0.0, 1.0) },
    })
    .collect();
  out.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
  out.truncate(TOP_K);
  out
}
