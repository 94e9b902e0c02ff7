//! Per-entity form inputs and their validation.
//!
//! Each form only reads its own allow-listed fields out of a submission.
//! `validate*` returns the cleaned fields or a [`FormErrors`] map keyed by
//! field name, which the handlers hand back to the renderer untouched.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::media::UploadedFile;
use crate::models::{
    Event, EventFields, Friend, FriendFields, MilestoneFields, SlamFields, TimelineEvent,
};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_DATE: &str = "Enter a valid date (YYYY-MM-DD).";
pub const INVALID_IMAGE: &str = "Upload a valid image file.";

/// Raw submission: text fields plus zero or more files per field name.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, Vec<UploadedFile>>,
}

impl FormData {
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn file(&self, name: &str) -> Option<UploadedFile> {
        self.files.get(name).and_then(|f| f.first()).cloned()
    }

    pub fn files(&self, name: &str) -> &[UploadedFile] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Field name -> message. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Cleaned text fields plus the image, if one was uploaded.
#[derive(Debug, Clone)]
pub struct Validated<F> {
    pub fields: F,
    pub image: Option<UploadedFile>,
}

// -- Field helpers --

fn required_text(errors: &mut FormErrors, field: &'static str, raw: &str, max: Option<usize>) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        check_length(errors, field, value, max);
    }
    value.to_string()
}

fn optional_text(errors: &mut FormErrors, field: &'static str, raw: &str, max: Option<usize>) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    check_length(errors, field, value, max);
    Some(value.to_string())
}

fn check_length(errors: &mut FormErrors, field: &'static str, value: &str, max: Option<usize>) {
    if let Some(max) = max {
        let len = value.chars().count();
        if len > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }
}

fn required_date(errors: &mut FormErrors, field: &'static str, raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, INVALID_DATE);
            None
        }
    }
}

fn image(errors: &mut FormErrors, field: &'static str, file: &Option<UploadedFile>, required: bool) {
    match file {
        Some(f) if !f.is_image() => errors.add(field, INVALID_IMAGE),
        None if required => errors.add(field, REQUIRED),
        _ => {}
    }
}

// -- Friend --

#[derive(Debug, Clone, Default, Serialize)]
pub struct FriendForm {
    pub name: String,
    pub nickname: String,
    pub memory_text: String,
    pub future_goal: String,
    pub special_power: String,
    pub weakness: String,
    pub signature_dialogue: String,
    #[serde(skip)]
    pub photo: Option<UploadedFile>,
}

impl FriendForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            name: data.text("name"),
            nickname: data.text("nickname"),
            memory_text: data.text("memory_text"),
            future_goal: data.text("future_goal"),
            special_power: data.text("special_power"),
            weakness: data.text("weakness"),
            signature_dialogue: data.text("signature_dialogue"),
            photo: data.file("photo"),
        }
    }

    pub fn from_friend(friend: &Friend) -> Self {
        Self {
            name: friend.name.clone(),
            nickname: friend.nickname.clone(),
            memory_text: friend.memory_text.clone(),
            future_goal: friend.future_goal.clone().unwrap_or_default(),
            special_power: friend.special_power.clone().unwrap_or_default(),
            weakness: friend.weakness.clone().unwrap_or_default(),
            signature_dialogue: friend.signature_dialogue.clone().unwrap_or_default(),
            photo: None,
        }
    }

    /// Validate a new friend: the photo is mandatory.
    pub fn validate_create(&self) -> Result<(FriendFields, UploadedFile), FormErrors> {
        let Validated { fields, image } = self.validate(true)?;
        match image {
            Some(photo) => Ok((fields, photo)),
            None => {
                let mut errors = FormErrors::default();
                errors.add("photo", REQUIRED);
                Err(errors)
            }
        }
    }

    /// Validate an edit: omitting the photo keeps the current one.
    pub fn validate_edit(&self) -> Result<Validated<FriendFields>, FormErrors> {
        self.validate(false)
    }

    fn validate(&self, require_photo: bool) -> Result<Validated<FriendFields>, FormErrors> {
        let mut errors = FormErrors::default();
        let fields = FriendFields {
            name: required_text(&mut errors, "name", &self.name, Some(100)),
            nickname: required_text(&mut errors, "nickname", &self.nickname, Some(50)),
            memory_text: required_text(&mut errors, "memory_text", &self.memory_text, None),
            future_goal: optional_text(&mut errors, "future_goal", &self.future_goal, Some(200)),
            special_power: optional_text(&mut errors, "special_power", &self.special_power, Some(200)),
            weakness: optional_text(&mut errors, "weakness", &self.weakness, Some(200)),
            signature_dialogue: optional_text(
                &mut errors,
                "signature_dialogue",
                &self.signature_dialogue,
                Some(200),
            ),
        };
        image(&mut errors, "photo", &self.photo, require_photo);
        errors.into_result(Validated { fields, image: self.photo.clone() })
    }
}

// -- Event --

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventForm {
    pub title: String,
    pub date: String,
    pub description: String,
    #[serde(skip)]
    pub cover_image: Option<UploadedFile>,
}

impl EventForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            title: data.text("title"),
            date: data.text("date"),
            description: data.text("description"),
            cover_image: data.file("cover_image"),
        }
    }

    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            description: event.description.clone().unwrap_or_default(),
            cover_image: None,
        }
    }

    pub fn validate_create(&self) -> Result<(EventFields, UploadedFile), FormErrors> {
        let mut errors = FormErrors::default();
        let fields = self.clean(&mut errors);
        image(&mut errors, "cover_image", &self.cover_image, true);
        match (fields, self.cover_image.clone()) {
            (Some(fields), Some(cover)) if errors.is_empty() => Ok((fields, cover)),
            _ => Err(errors),
        }
    }

    pub fn validate_edit(&self) -> Result<Validated<EventFields>, FormErrors> {
        let mut errors = FormErrors::default();
        let fields = self.clean(&mut errors);
        image(&mut errors, "cover_image", &self.cover_image, false);
        match fields {
            Some(fields) => errors.into_result(Validated { fields, image: self.cover_image.clone() }),
            None => Err(errors),
        }
    }

    fn clean(&self, errors: &mut FormErrors) -> Option<EventFields> {
        let title = required_text(errors, "title", &self.title, Some(200));
        let date = required_date(errors, "date", &self.date);
        let description = optional_text(errors, "description", &self.description, None);
        date.map(|date| EventFields { title, date, description })
    }
}

// -- Milestone --

#[derive(Debug, Clone, Default, Serialize)]
pub struct MilestoneForm {
    pub title: String,
    pub date: String,
    pub description: String,
    #[serde(skip)]
    pub image: Option<UploadedFile>,
}

impl MilestoneForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            title: data.text("title"),
            date: data.text("date"),
            description: data.text("description"),
            image: data.file("image"),
        }
    }

    pub fn from_milestone(milestone: &TimelineEvent) -> Self {
        Self {
            title: milestone.title.clone(),
            date: milestone.date.format("%Y-%m-%d").to_string(),
            description: milestone.description.clone(),
            image: None,
        }
    }

    /// The image is optional for both create and edit.
    pub fn validate(&self) -> Result<Validated<MilestoneFields>, FormErrors> {
        let mut errors = FormErrors::default();
        let title = required_text(&mut errors, "title", &self.title, Some(200));
        let date = required_date(&mut errors, "date", &self.date);
        let description = required_text(&mut errors, "description", &self.description, None);
        image(&mut errors, "image", &self.image, false);
        match date {
            Some(date) => errors.into_result(Validated {
                fields: MilestoneFields { title, date, description },
                image: self.image.clone(),
            }),
            None => Err(errors),
        }
    }
}

// -- Photo upload --

#[derive(Debug, Clone, Default, Serialize)]
pub struct PhotoUploadForm {
    pub caption: String,
    #[serde(skip)]
    pub images: Vec<UploadedFile>,
}

/// Outcome of a bulk upload submission.
#[derive(Debug, Clone)]
pub enum PhotoBatch {
    /// No files were attached; nothing to do.
    Empty,
    Ready {
        images: Vec<UploadedFile>,
        caption: Option<String>,
    },
}

impl PhotoUploadForm {
    pub fn from_data(data: &FormData) -> Self {
        Self {
            caption: data.text("caption"),
            images: data.files("images").to_vec(),
        }
    }

    pub fn validate(&self) -> Result<PhotoBatch, FormErrors> {
        if self.images.is_empty() {
            return Ok(PhotoBatch::Empty);
        }
        let mut errors = FormErrors::default();
        let caption = optional_text(&mut errors, "caption", &self.caption, Some(300));
        if let Some(bad) = self.images.iter().find(|f| !f.is_image()) {
            errors.add("images", format!("{} is not an image.", bad.file_name));
        }
        errors.into_result(PhotoBatch::Ready {
            images: self.images.clone(),
            caption,
        })
    }
}

// -- Slam book --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlamBookForm {
    pub sender_name: String,
    pub message: String,
}

impl SlamBookForm {
    pub fn validate(&self) -> Result<SlamFields, FormErrors> {
        let mut errors = FormErrors::default();
        let fields = SlamFields {
            sender_name: required_text(&mut errors, "sender_name", &self.sender_name, Some(100)),
            message: required_text(&mut errors, "message", &self.message, None),
        };
        errors.into_result(fields)
    }
}
