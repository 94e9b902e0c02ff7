use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Logical storage folder for an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    FriendPhoto,
    EventCover,
    EventPhoto,
    Timeline,
    Award,
}

impl MediaKind {
    pub fn dir(self) -> &'static str {
        match self {
            Self::FriendPhoto => "friend_photos",
            Self::EventCover => "event_covers",
            Self::EventPhoto => "event_photos",
            Self::Timeline => "timeline",
            Self::Award => "awards",
        }
    }
}

/// One file part of a multipart submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(str::to_owned),
            bytes: bytes.into(),
        }
    }

    /// True when either the declared content type or the file extension
    /// names an image.
    pub fn is_image(&self) -> bool {
        let declared = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        declared || self.guessed_image_extension().is_some()
    }

    /// Extension to store the file under. Prefers the uploaded name's own
    /// extension, then one derived from the content type.
    pub fn extension(&self) -> String {
        if let Some(ext) = self.guessed_image_extension() {
            return ext;
        }
        self.content_type
            .as_deref()
            .and_then(mime_guess::get_mime_extensions_str)
            .and_then(|exts| exts.iter().find(|e| e.len() <= 4).or(exts.first()))
            .map(|e| e.to_string())
            .unwrap_or_else(|| "img".to_string())
    }

    fn guessed_image_extension(&self) -> Option<String> {
        let guess = mime_guess::from_path(&self.file_name).first()?;
        if guess.type_() != mime_guess::mime::IMAGE {
            return None;
        }
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}
