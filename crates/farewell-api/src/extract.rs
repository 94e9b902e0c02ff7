use axum::extract::{FromRequestParts, Multipart, Path};
use axum::http::request::Parts;
use serde::Deserialize;

use farewell_types::forms::FormData;
use farewell_types::media::UploadedFile;

use crate::error::AppError;

/// Integer primary key from the path. Anything that isn't one is a 404,
/// same as an id that doesn't exist.
#[derive(Debug, Clone, Copy)]
pub struct RecordId(pub i64);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Ok(Self(id))
    }
}

/// `?msg=` status line set by the previous redirect.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub msg: Option<String>,
}

/// Drain a multipart body into text fields and files. Empty file inputs
/// (no name, no bytes) are what browsers send for an untouched picker, so
/// they are dropped.
pub async fn read_form(mut multipart: Multipart) -> Result<FormData, AppError> {
    let mut data = FormData::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match field.file_name().map(str::to_owned) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                data.files.entry(name).or_default().push(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                let value = field.text().await?;
                data.fields.insert(name, value);
            }
        }
    }

    Ok(data)
}
