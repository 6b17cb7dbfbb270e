use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
};
use rig::completion::CompletionModel;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::{ApiError, AppState};
use crate::error::Error;
use crate::report::AnalysisReport;
use crate::request::{AnalysisForm, UploadedFile, validate_request};

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

#[instrument(skip_all)]
pub(super) async fn analyze<M>(
    State(state): State<AppState<M>>,
    request: Request,
) -> Result<Json<AnalysisReport>, ApiError>
where
    M: CompletionModel + 'static,
{
    let form = read_form(request, &state).await?;
    let analysis_request = validate_request(form)?;
    let report = state.service.run(&analysis_request).await?;
    Ok(Json(report))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Read the analysis form from a multipart or urlencoded body
async fn read_form<S>(request: Request, state: &S) -> Result<AnalysisForm, ApiError>
where
    S: Send + Sync,
{
    if is_multipart(&request) {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))?;
        read_multipart(multipart).await
    } else {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))?;

        let mut form = AnalysisForm::default();
        for (name, value) in pairs {
            if !form.set_field(&name, value) {
                debug!("Ignoring unknown form field {}", name);
            }
        }
        Ok(form)
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<AnalysisForm, ApiError> {
    let mut form = AnalysisForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::FileProcessing(e.body_text()))?;
            debug!("Received upload {} ({} bytes)", filename, bytes.len());
            form.file = Some(UploadedFile {
                filename,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        if !form.set_field(&name, value) {
            debug!("Ignoring unknown form field {}", name);
        }
    }

    Ok(form)
}
