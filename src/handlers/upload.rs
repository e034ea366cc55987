use anyhow::anyhow;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm::newsroom::newsify;
use crate::llm::styles::ArticleStyle;
use crate::state::AppState;
use crate::storage::{allowed_extension, save_upload, unique_filename, write_stylesheet};
use crate::utils::timing::UploadTimer;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub article: String,
    pub alt_text: String,
    pub image_url: String,
    pub theme_css: String,
}

#[derive(Debug, Default)]
struct UploadForm {
    file_name: Option<String>,
    file_bytes: Option<Vec<u8>>,
    style: Option<String>,
}

/// Body-limit failures surface as 413; anything else is a malformed form.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::payload_too_large("Uploaded file is too large");
    }
    AppError::bad_request(format!("{context}: {err}"))
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to parse multipart data", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                // A plain text field named `file` is not a file upload.
                let Some(file_name) = field.file_name().map(|name| name.to_string()) else {
                    continue;
                };
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read uploaded file", e))?;
                form.file_name = Some(file_name);
                form.file_bytes = Some(bytes.to_vec());
            }
            "style" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read style field", e))?;
                form.style = Some(value);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn parse_style(value: Option<&str>) -> Result<ArticleStyle, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(ArticleStyle::default()),
        Some(key) => key
            .parse::<ArticleStyle>()
            .map_err(|_| AppError::bad_request("Unsupported style")),
    }
}

pub fn build_image_url(public_base_url: &str, filename: &str) -> anyhow::Result<String> {
    let base = Url::parse(&format!("{}/", public_base_url.trim_end_matches('/')))
        .map_err(|err| anyhow!("Invalid public base URL '{}': {}", public_base_url, err))?;
    let url = base
        .join(&format!("uploads/{filename}"))
        .map_err(|err| anyhow!("Failed to build image URL for {}: {}", filename, err))?;
    Ok(url.to_string())
}

pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let request_id = Uuid::new_v4().simple().to_string();
    let mut timer = UploadTimer::new(&request_id);

    let result = process_upload(&state, &mut multipart, &mut timer).await;
    match &result {
        Ok(_) => timer.mark_status("success", None),
        Err(AppError::BadRequest { message } | AppError::PayloadTooLarge { message }) => {
            timer.mark_status("rejected", Some(message.clone()))
        }
        Err(err) => timer.mark_status("error", Some(err.to_string())),
    }
    timer.log_completed();

    result.map(Json)
}

async fn process_upload(
    state: &AppState,
    multipart: &mut Multipart,
    timer: &mut UploadTimer,
) -> Result<UploadResponse, AppError> {
    let form = read_form(multipart).await?;
    timer.set_original_name(form.file_name.as_deref());
    timer.set_style(form.style.as_deref().unwrap_or(""));
    timer.log_received();

    let (Some(file_name), Some(bytes)) = (form.file_name, form.file_bytes) else {
        return Err(AppError::bad_request("No file part"));
    };
    let Some(extension) = allowed_extension(&file_name) else {
        return Err(AppError::bad_request("Unsupported file type"));
    };
    let style = parse_style(form.style.as_deref())?;
    timer.set_style(style.key());

    let config = &state.config;
    let stored_name = unique_filename(&extension);
    save_upload(&config.upload_dir, &stored_name, &bytes).await?;
    timer.set_stored_name(&stored_name);
    info!(
        "Saved upload {} as {} ({} bytes, style={})",
        file_name,
        stored_name,
        bytes.len(),
        style
    );

    let scene = newsify(config, &bytes, style).await?;
    debug!(
        "Newsified {}: description={} chars, article={} chars, css={} chars",
        stored_name,
        scene.description.chars().count(),
        scene.article.chars().count(),
        scene.theme_css.chars().count()
    );

    {
        let _guard = state.stylesheet_lock.lock().await;
        write_stylesheet(&config.stylesheet_path, &scene.theme_css).await?;
    }

    Ok(UploadResponse {
        article: scene.article,
        alt_text: scene.alt_text,
        image_url: build_image_url(&config.public_base_url, &stored_name)?,
        theme_css: scene.theme_css,
    })
}
