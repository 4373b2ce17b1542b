use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::{debug, error, info};

use crate::{
    error::RelayError,
    predictor::{Analysis, ImageUpload, PredictorClient, IMAGE_FIELD},
    AppState,
};

/// `POST /api/analyze`: relays one uploaded image to the predictor.
///
/// A body that isn't multipart at all is treated like a form without an
/// `image` part.
pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Analysis>, RelayError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Rejected upload body: {rejection}");
        RelayError::NoImage
    })?;

    let upload = read_image(&mut multipart)
        .await
        .and_then(|upload| upload.ok_or(RelayError::NoImage))
        .inspect_err(log_failure)?;

    relay(&state.predictor, upload)
        .await
        .map(Json)
        .inspect_err(log_failure)
}

/// Sends the upload to the predictor and shapes its answer for display.
pub async fn relay(predictor: &PredictorClient, upload: ImageUpload) -> Result<Analysis, RelayError> {
    info!(
        "Relaying {} ({} bytes) to {}",
        upload.filename_or_default(),
        upload.bytes.len(),
        predictor.url()
    );

    let raw = predictor.predict(upload).await?;
    Analysis::try_from(raw).map_err(RelayError::internal)
}

/// Pulls the first non-empty `image` part out of the form, skipping every other field.
async fn read_image(multipart: &mut Multipart) -> Result<Option<ImageUpload>, RelayError> {
    while let Some(field) = multipart.next_field().await.map_err(RelayError::internal)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(RelayError::internal)?;

        if bytes.is_empty() {
            debug!("Ignoring empty image part");
            continue;
        }

        return Ok(Some(ImageUpload {
            bytes,
            filename,
            content_type,
        }));
    }

    Ok(None)
}

fn log_failure(err: &RelayError) {
    match err {
        RelayError::NoImage => debug!("Upload carried no image"),
        RelayError::Upstream(cause) => debug!("Upstream failure: {cause}"),
        RelayError::Internal(cause) => error!("Error while analyzing image: {cause}"),
    }
}
