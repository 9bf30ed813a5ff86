//! Photo attachment for the report form
//!
//! Accepted and previewed locally only; the create request does not carry it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use shared::validation::MAX_PHOTO_BYTES;
use shared::{AppError, ErrorCode};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl PhotoAttachment {
    /// Validate an in-memory file: non-empty, at most 5 MiB, image MIME type
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AppError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile).with_detail("file", file_name));
        }
        check_size(bytes.len() as u64, &file_name)?;
        let mime_type = image_mime(&file_name)?;
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Read and validate a file from disk; the size is checked before reading
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let metadata = tokio::fs::metadata(path).await.map_err(|e| read_error(path, e))?;
        check_size(metadata.len(), &file_name)?;
        image_mime(&file_name)?;

        let bytes = tokio::fs::read(path).await.map_err(|e| read_error(path, e))?;
        Self::from_bytes(file_name, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// `data:` URL for rendering a preview
    pub fn preview_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

fn check_size(len: u64, file_name: &str) -> Result<(), AppError> {
    if len > MAX_PHOTO_BYTES {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            "A imagem deve ter no máximo 5MB",
        )
        .with_detail("file", file_name)
        .with_detail("size", len));
    }
    Ok(())
}

fn image_mime(file_name: &str) -> Result<String, AppError> {
    match mime_guess::from_path(file_name).first() {
        Some(mime) if mime.type_().as_str() == "image" => Ok(mime.essence_str().to_string()),
        _ => Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            "Selecione um arquivo de imagem",
        )
        .with_detail("file", file_name)),
    }
}

fn read_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::with_message(ErrorCode::FileReadFailed, format!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_small_image() {
        let photo = PhotoAttachment::from_bytes("buraco.jpg", vec![0xFF, 0xD8, 0xFF]).unwrap();
        assert_eq!(photo.mime_type(), "image/jpeg");
        assert_eq!(photo.size(), 3);
        assert_eq!(photo.preview_data_url(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_rejects_non_image() {
        let err = PhotoAttachment::from_bytes("laudo.pdf", vec![1, 2, 3]).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        let err = PhotoAttachment::from_bytes("foto.png", Vec::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyFile);

        let big = vec![0u8; MAX_PHOTO_BYTES as usize + 1];
        let err = PhotoAttachment::from_bytes("foto.png", big).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileTooLarge);

        let exact = vec![0u8; MAX_PHOTO_BYTES as usize];
        assert!(PhotoAttachment::from_bytes("foto.png", exact).is_ok());
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poste.png");
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G']).await.unwrap();

        let photo = PhotoAttachment::from_path(&path).await.unwrap();
        assert_eq!(photo.file_name(), "poste.png");
        assert_eq!(photo.mime_type(), "image/png");

        let missing = dir.path().join("nada.png");
        let err = PhotoAttachment::from_path(&missing).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FileReadFailed);
    }
}
