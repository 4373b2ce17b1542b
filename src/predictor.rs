use axum::body::Bytes;
use reqwest::{
    multipart::{Form, Part},
    Client, Url,
};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::{RelayError, UpstreamError};

pub const IMAGE_FIELD: &str = "image";
pub const DEFAULT_FILENAME: &str = "crop.jpg";

/// Separator between crop and condition in `crop_disease` labels,
/// e.g. `Tomato___Late_blight`.
const LABEL_SEPARATOR: &str = "___";
const HEALTHY_LABEL: &str = "healthy";

/// A single uploaded image, held in memory for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl ImageUpload {
    pub fn filename_or_default(&self) -> &str {
        match self.filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_FILENAME,
        }
    }
}

/// Raw JSON answer of the predictor. Every field is optional on the wire;
/// [`Analysis::try_from`] decides what is required.
#[derive(Deserialize, Debug, Default)]
pub struct PredictorResponse {
    pub crop: Option<String>,
    pub disease: Option<String>,
    pub crop_disease: Option<String>,
    pub confidence: Option<Number>,
    pub suggestion: Option<String>,
    pub text: Option<String>,
}

/// The normalized result handed back to the form view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Analysis {
    pub crop: String,
    pub disease: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub text: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum ShapeError {
    /// The predictor is expected to answer with at least a `crop`; a 2xx
    /// answer without one is not relayed.
    #[error("predictor response has neither `crop` nor `crop_disease`")]
    MissingCrop,
}

impl TryFrom<PredictorResponse> for Analysis {
    type Error = ShapeError;

    fn try_from(raw: PredictorResponse) -> Result<Self, Self::Error> {
        let (crop, disease) = match (raw.crop, raw.crop_disease) {
            (Some(crop), _) => (crop, raw.disease),
            (None, Some(label)) => {
                let (crop, condition) = split_label(&label);
                (crop, raw.disease.or(condition))
            }
            (None, None) => return Err(ShapeError::MissingCrop),
        };

        let text = match raw.text {
            Some(text) if !text.is_empty() => text,
            _ => summary(&crop, disease.as_deref()),
        };

        Ok(Analysis {
            crop,
            disease,
            confidence: raw.confidence,
            suggestion: raw.suggestion,
            text,
        })
    }
}

/// `Detected Crop: <crop>. Disease: <disease>.`, with `None` standing in for
/// an absent or empty disease.
pub fn summary(crop: &str, disease: Option<&str>) -> String {
    let disease = disease.filter(|d| !d.is_empty()).unwrap_or("None");
    format!("Detected Crop: {crop}. Disease: {disease}.")
}

fn split_label(label: &str) -> (String, Option<String>) {
    let humanize = |part: &str| part.replace('_', " ").trim().to_string();

    match label.split_once(LABEL_SEPARATOR) {
        Some((crop, condition)) => {
            let condition = humanize(condition);
            let disease = (!condition.is_empty() && !condition.eq_ignore_ascii_case(HEALTHY_LABEL))
                .then_some(condition);
            (humanize(crop), disease)
        }
        None => (humanize(label), None),
    }
}

/// Thin wrapper over a pooled [`reqwest::Client`] bound to one predictor URL.
#[derive(Clone, Debug)]
pub struct PredictorClient {
    http: Client,
    url: Url,
}

impl PredictorClient {
    pub fn new(url: Url) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(http: Client, url: Url) -> Self {
        Self { http, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Forwards the upload as a fresh multipart body and decodes the JSON answer.
    ///
    /// Transport failures and non-2xx statuses map to [`RelayError::Upstream`];
    /// an undecodable body is an internal error.
    pub async fn predict(&self, upload: ImageUpload) -> Result<PredictorResponse, RelayError> {
        let form = Form::new().part(IMAGE_FIELD, image_part(upload)?);

        let response = self
            .http
            .post(self.url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Predictor at {} unreachable: {e}", self.url);
                RelayError::Upstream(UpstreamError::Unreachable(e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Predictor at {} answered {status}", self.url);
            return Err(RelayError::Upstream(UpstreamError::Status(status)));
        }
        info!("Predictor answered {status}");

        response
            .json::<PredictorResponse>()
            .await
            .map_err(RelayError::internal)
    }
}

fn image_part(upload: ImageUpload) -> Result<Part, RelayError> {
    let filename = upload.filename_or_default().to_string();
    let part = Part::bytes(upload.bytes.to_vec()).file_name(filename);

    match upload.content_type {
        Some(content_type) => part.mime_str(&content_type).map_err(RelayError::internal),
        None => Ok(part),
    }
}
