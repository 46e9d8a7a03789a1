// src/services/upload_service.rs

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{common::error::AppError, models::uploads::UploadResponse};

/// Tipos aceitos: (content-type, extensão gravada em disco).
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("application/pdf", "pdf"),
];

/// Resolve a extensão a partir do content-type enviado ou, na falta dele, do nome do arquivo.
pub fn resolve_extension(content_type: Option<&str>, file_name: Option<&str>) -> Option<(&'static str, &'static str)> {
    if let Some(ct) = content_type {
        let ct = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if let Some(found) = ALLOWED_TYPES.iter().find(|(mime, _)| *mime == ct) {
            return Some(*found);
        }
    }

    let ext = Path::new(file_name?)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
    ALLOWED_TYPES.iter().find(|(_, e)| *e == ext).copied()
}

/// Remove diretórios e caracteres de controle do nome original.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    let clean: String = base.chars().filter(|c| !c.is_control()).take(255).collect();
    if clean.is_empty() { None } else { Some(clean) }
}

#[derive(Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(upload_dir: PathBuf, max_bytes: usize) -> Self {
        Self { upload_dir, max_bytes }
    }

    /// Grava o arquivo com nome aleatório e devolve a URL pública.
    pub async fn store(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadResponse, AppError> {
        if bytes.is_empty() {
            return Err(AppError::BadRequest("O arquivo está vazio.".into()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "O arquivo excede o limite de {} bytes.",
                self.max_bytes
            )));
        }

        let (mime, ext) = resolve_extension(content_type, file_name).ok_or_else(|| {
            AppError::BadRequest("Tipo de arquivo não permitido. Use PNG, JPEG, GIF, WEBP ou PDF.".into())
        })?;

        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::write(self.upload_dir.join(&stored_name), bytes).await?;

        tracing::info!("📎 Upload salvo: {} ({} bytes)", stored_name, bytes.len());

        Ok(UploadResponse {
            url: format!("/uploads/{}", stored_name),
            original_name: file_name.and_then(sanitize_file_name),
            content_type: mime.to_string(),
            size: bytes.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_wins_over_file_name() {
        assert_eq!(
            resolve_extension(Some("image/png"), Some("foto.pdf")),
            Some(("image/png", "png"))
        );
        assert_eq!(
            resolve_extension(Some("image/jpeg; charset=binary"), None),
            Some(("image/jpeg", "jpg"))
        );
    }

    #[test]
    fn falls_back_to_extension() {
        assert_eq!(
            resolve_extension(Some("application/octet-stream"), Some("Atestado.PDF")),
            Some(("application/pdf", "pdf"))
        );
        assert_eq!(resolve_extension(None, Some("foto.jpeg")), Some(("image/jpeg", "jpg")));
    }

    #[test]
    fn rejects_unknown_types() {
        assert_eq!(resolve_extension(Some("text/html"), Some("pagina.html")), None);
        assert_eq!(resolve_extension(None, Some("script.sh")), None);
        assert_eq!(resolve_extension(None, None), None);
    }

    #[test]
    fn strips_directories_from_original_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name("C:\\fotos\\eu.png").as_deref(), Some("eu.png"));
        assert_eq!(sanitize_file_name("   "), None);
    }

    #[tokio::test]
    async fn stores_file_under_random_name() {
        let dir = std::env::temp_dir().join(format!("fyzen-uploads-{}", Uuid::new_v4()));
        let service = UploadService::new(dir.clone(), 1024);

        let response = service.store(Some("foto.png"), Some("image/png"), b"\x89PNG").await.unwrap();

        assert!(response.url.starts_with("/uploads/"));
        assert!(response.url.ends_with(".png"));
        assert_eq!(response.size, 4);
        assert_eq!(response.original_name.as_deref(), Some("foto.png"));

        let stored = response.url.trim_start_matches("/uploads/");
        assert_eq!(tokio::fs::read(dir.join(stored)).await.unwrap(), b"\x89PNG");
        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let service = UploadService::new(std::env::temp_dir(), 1024);
        let err = service.store(Some("a.png"), Some("image/png"), &[]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_before_touching_disk() {
        let dir = std::env::temp_dir().join(format!("fyzen-uploads-{}", Uuid::new_v4()));
        let service = UploadService::new(dir.clone(), 8);

        let err = service.store(Some("a.pdf"), Some("application/pdf"), &[0u8; 9]).await.unwrap_err();

        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert!(!dir.exists());
    }
}
