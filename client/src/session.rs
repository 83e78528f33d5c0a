use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use shared::InferenceOutcome;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::imaging::UploadedImage;
use crate::imaging::normalize::{self, ImageInfo, NormalizeError};
use crate::imaging::validation::{self, ValidationError};
use crate::inference::client::InferenceService;

/// Aborts before a request is ever sent; transport and server
/// failures arrive as `InferenceOutcome::Failure` instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Caller-owned, last-write-wins. A pre-request failure clears it so
/// a stale success is never shown next to a fresh error.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    last_outcome: Option<InferenceOutcome>,
    last_duration: Option<Duration>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_outcome(&self) -> Option<&InferenceOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    fn record(&mut self, outcome: InferenceOutcome, duration: Duration) {
        self.last_outcome = Some(outcome);
        self.last_duration = Some(duration);
    }

    fn clear(&mut self) {
        self.last_outcome = None;
        self.last_duration = None;
    }
}

#[derive(Debug)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub image: ImageInfo,
    pub outcome: InferenceOutcome,
    pub duration: Duration,
}

/// One upload in flight at a time; nothing is retried or queued.
pub struct Pipeline {
    config: Config,
    inference: InferenceService,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let inference = InferenceService::new(&config);
        Self { config, inference }
    }

    pub fn analyze(
        &self,
        upload: &UploadedImage,
        session: &mut AnalysisSession,
    ) -> Result<AnalysisReport, AnalysisError> {
        let id = Uuid::new_v4();

        log::info!("[{}] Validating upload ({} bytes)", id, upload.declared_size);
        if let Err(e) = validation::validate(upload, &self.config) {
            session.clear();
            return Err(e.into());
        }

        log::info!("[{}] Normalizing image", id);
        let normalized = match normalize::normalize(&upload.bytes, self.config.jpeg_quality) {
            Ok(normalized) => normalized,
            Err(e) => {
                session.clear();
                return Err(e.into());
            }
        };

        log::info!(
            "[{}] Sending {} bytes to {}",
            id,
            normalized.bytes.len(),
            self.config.predictions_url()
        );
        let started = Instant::now();
        let outcome = self.inference.infer(&normalized.bytes);
        let duration = started.elapsed();

        match &outcome {
            InferenceOutcome::Success { predictions } => {
                log::info!(
                    "[{}] Analysis complete in {:.2?} ({} classes)",
                    id,
                    duration,
                    predictions.len()
                );
            }
            InferenceOutcome::Failure { kind, message } => {
                log::error!("[{}] Analysis failed ({}): {}", id, kind, message);
            }
        }

        session.record(outcome.clone(), duration);

        Ok(AnalysisReport {
            id,
            analyzed_at: Utc::now(),
            image: normalized.info,
            outcome,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{ImageFormat, RgbImage};
    use shared::ErrorKind;
    use url::Url;

    fn png_upload() -> UploadedImage {
        let img = RgbImage::from_pixel(8, 8, image::Rgb([200, 120, 40]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        UploadedImage::from_bytes(bytes, Some("pet.png".to_string()))
    }

    fn pipeline_for(base: &str) -> Pipeline {
        Pipeline::new(Config {
            endpoint_base: Url::parse(base).unwrap(),
            request_timeout: Duration::from_secs(5),
            ..Config::default()
        })
    }

    #[test]
    fn analyze_runs_the_full_pipeline_and_records_the_session() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/predictions/resnet")
            .match_header("content-type", "application/octet-stream")
            .with_status(200)
            .with_body(r#"{"tabby": 0.62, "tiger_cat": 0.30}"#)
            .create();

        let pipeline = pipeline_for(&server.url());
        let mut session = AnalysisSession::new();
        let report = pipeline.analyze(&png_upload(), &mut session).unwrap();

        mock.assert();
        assert!(report.outcome.is_success());
        assert_eq!(report.image.width, 8);
        assert_eq!(session.last_outcome(), Some(&report.outcome));
        assert!(session.last_duration().is_some());
    }

    #[test]
    fn a_failed_request_overwrites_the_previous_success() {
        let mut server = mockito::Server::new();
        let ok = server
            .mock("POST", "/predictions/resnet")
            .with_status(200)
            .with_body(r#"{"tabby": 0.62}"#)
            .expect(1)
            .create();

        let pipeline = pipeline_for(&server.url());
        let mut session = AnalysisSession::new();
        pipeline.analyze(&png_upload(), &mut session).unwrap();
        assert!(session.last_outcome().unwrap().is_success());
        ok.remove();

        let _failing = server
            .mock("POST", "/predictions/resnet")
            .with_status(500)
            .with_body(r#"{"message": "model worker died"}"#)
            .create();

        let report = pipeline.analyze(&png_upload(), &mut session).unwrap();
        let InferenceOutcome::Failure { kind, .. } = &report.outcome else {
            panic!("expected failure");
        };
        assert_eq!(*kind, ErrorKind::ServerError);
        assert!(!session.last_outcome().unwrap().is_success());
    }

    #[test]
    fn a_validation_failure_clears_the_session_without_a_request() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/predictions/resnet")
            .with_status(200)
            .with_body(r#"{"tabby": 0.62}"#)
            .expect(1)
            .create();

        let pipeline = pipeline_for(&server.url());
        let mut session = AnalysisSession::new();
        pipeline.analyze(&png_upload(), &mut session).unwrap();
        assert!(session.last_outcome().is_some());

        let garbage = UploadedImage::from_bytes(b"nope".to_vec(), Some("nope.png".to_string()));
        let err = pipeline.analyze(&garbage, &mut session).unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
        assert!(session.last_outcome().is_none());
        assert!(session.last_duration().is_none());
        // Only the first, valid upload reached the endpoint.
        mock.assert();
    }
}
