//! Resume and photo uploads attached to applications.
//!
//! Files land under `{upload_dir}/{kind}s/` and are served back from
//! `/uploads/{kind}s/{name}`. Nothing removes a file whose application was
//! never submitted.

use std::path::{Path as FsPath, PathBuf};
use std::str::FromStr;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{
    HttpResponse, get, post,
    web::{Data, Path, ServiceConfig, scope},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::ServiceError;

/// Which kind of file an applicant is uploading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    Photo,
}

impl UploadKind {
    /// Directory the kind is stored under
    pub fn folder(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::Photo => "photos",
        }
    }
}

impl FromStr for UploadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume" => Ok(UploadKind::Resume),
            "photo" => Ok(UploadKind::Photo),
            other => Err(format!("Unknown upload kind: {}", other)),
        }
    }
}

/// Relative storage path: `{kind}s/{jobId}_{safeEmail}_{cleanName}`
///
/// `@` and `.` in the email become `_`, whitespace runs in the file name
/// collapse to one `_`, and any directory part of the client file name is
/// discarded.
pub fn storage_path(kind: UploadKind, job_id: Uuid, email: &str, file_name: &str) -> String {
    let safe_email: String = email
        .trim()
        .chars()
        .map(|c| if c == '@' || c == '.' || c == '/' || c == '\\' { '_' } else { c })
        .collect();

    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let clean_name = base.split_whitespace().collect::<Vec<_>>().join("_");
    let clean_name = if clean_name.is_empty() || clean_name.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        clean_name
    };

    format!("{}/{}_{}_{}", kind.folder(), job_id, safe_email, clean_name)
}

/// Local file storage plus the public URL files are reachable at
pub struct UploadStore {
    root: PathBuf,
    public_base_url: String,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Copy an uploaded temp file into place and return its URL
    pub async fn save(
        &self,
        kind: UploadKind,
        job_id: Uuid,
        email: &str,
        file_name: &str,
        source: &FsPath,
    ) -> Result<String, std::io::Error> {
        let relative = storage_path(kind, job_id, email, file_name);
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(source, &target).await?;

        info!("Stored upload at {}", target.display());
        Ok(format!("{}/uploads/{}", self.public_base_url, relative))
    }

    /// Contents of a stored file; `None` for unknown folders or names
    pub async fn read(&self, folder: &str, name: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
        let known_folder = folder == UploadKind::Resume.folder() || folder == UploadKind::Photo.folder();
        if !known_folder || name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Ok(None);
        }

        match tokio::fs::read(self.root.join(folder).join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, MultipartForm)]
pub struct UploadForm {
    #[multipart(rename = "jobId")]
    pub job_id: Text<Uuid>,
    pub email: Text<String>,
    pub file: TempFile,
}

#[derive(Serialize)]
struct UploadResponse {
    url: String,
}

#[post("/{kind}")]
async fn upload_file(
    store: Data<UploadStore>,
    kind: Path<String>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> Result<HttpResponse, ServiceError> {
    let kind = kind
        .parse::<UploadKind>()
        .map_err(ServiceError::ValidationError)?;

    let email = form.email.into_inner();
    if email.trim().is_empty() {
        return Err(ServiceError::ValidationError("email is required".to_string()));
    }
    let file_name = form
        .file
        .file_name
        .clone()
        .unwrap_or_else(|| "upload".to_string());

    let url = store
        .save(kind, *form.job_id, &email, &file_name, form.file.file.path())
        .await
        .map_err(ServiceError::StorageError)?;

    Ok(HttpResponse::Created().json(UploadResponse { url }))
}

#[get("/{folder}/{name}")]
async fn download_file(
    store: Data<UploadStore>,
    path: Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (folder, name) = path.into_inner();
    match store.read(&folder, &name).await {
        Ok(Some(bytes)) => Ok(HttpResponse::Ok()
            .content_type("application/octet-stream")
            .body(bytes)),
        Ok(None) => Err(ServiceError::NotFound(format!("File {}/{} not found", folder, name))),
        Err(e) => {
            warn!("Failed to read upload {}/{}", folder, name);
            Err(ServiceError::StorageError(e))
        }
    }
}

pub fn upload_config(config: &mut ServiceConfig) {
    config.service(scope("uploads").service(upload_file).service(download_file));
}
