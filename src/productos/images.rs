use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::{error, info, instrument};

use super::dto::UrlImagen;
use crate::error::{ApiError, Error, Result};
use crate::http::ApiClient;

pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
    /// Base name without extension; the extension comes from the MIME type.
    pub nombre: &'a str,
}

/// Uploads a product picture and returns the url the backend stored it at.
#[instrument(skip(api, img), fields(content_type = img.content_type, size = img.body.len()))]
pub async fn subir_imagen(api: &ApiClient, img: UploadItem<'_>) -> Result<String> {
    if img.body.is_empty() {
        return Err(Error::Api(ApiError::Status {
            status: 400,
            message: "No se subió ningún archivo".into(),
        }));
    }

    let ext = ext_from_mime(img.content_type).unwrap_or("bin");
    let file_name = format!("{}.{}", sanitize(img.nombre), ext);
    let part = Part::bytes(img.body.to_vec())
        .file_name(file_name.clone())
        .mime_str(img.content_type)
        .map_err(ApiError::from)?;
    let form = Form::new().part("file", part);

    let res: UrlImagen = api
        .post_multipart("productos/upload", form)
        .await
        .map_err(|e| {
            error!(error = %e, %file_name, "image upload failed");
            Error::from(e)
        })?;
    info!(url = %res.url, "image uploaded");
    Ok(res.url)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "imagen".into()
    } else {
        cleaned
    }
}
