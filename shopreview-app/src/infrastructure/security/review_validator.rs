use crate::domain::{NewReview, ReviewEdit};
use shopreview_errors::AppError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
pub const MIN_CONTENT_CHARS: usize = 10;
pub const MAX_CONTENT_CHARS: usize = 1000;
pub const MAX_PHOTOS: usize = 4;
const MAX_URL_LENGTH: usize = 2048;

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Review input after validation: content trimmed and stripped of control characters.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReview {
    pub rating: u8,
    pub content: String,
    pub photos: Vec<String>,
}

/// Validated subset of an author edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedEdit {
    pub rating: Option<u8>,
    pub content: Option<String>,
    pub photos: Option<Vec<String>>,
}

impl ValidatedEdit {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.content.is_none() && self.photos.is_none()
    }
}

pub struct ReviewValidator;

impl ReviewValidator {
    /// Checks rating, content, then photos, and reports the first violation.
    pub fn validate_new(input: &NewReview) -> Result<ValidatedReview, AppError> {
        let rating = Self::validate_rating(input.rating)?;
        let content = Self::validate_content(&input.content)?;
        let photos = Self::validate_photos(&input.photos)?;
        Ok(ValidatedReview {
            rating,
            content,
            photos,
        })
    }

    pub fn validate_edit(edit: &ReviewEdit) -> Result<ValidatedEdit, AppError> {
        Ok(ValidatedEdit {
            rating: edit.rating.map(Self::validate_rating).transpose()?,
            content: edit
                .content
                .as_deref()
                .map(Self::validate_content)
                .transpose()?,
            photos: edit
                .photos
                .as_deref()
                .map(Self::validate_photos)
                .transpose()?,
        })
    }

    pub fn validate_rating(rating: i32) -> Result<u8, AppError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::Validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        u8::try_from(rating).map_err(|_| AppError::Validation("Rating is out of range".to_string()))
    }

    pub fn validate_content(content: &str) -> Result<String, AppError> {
        let stripped: String = content
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();
        let sanitized = stripped.trim().to_string();

        let length = sanitized.chars().count();
        if length < MIN_CONTENT_CHARS {
            return Err(AppError::Validation(format!(
                "Review must be at least {MIN_CONTENT_CHARS} characters"
            )));
        }
        if length > MAX_CONTENT_CHARS {
            return Err(AppError::Validation(format!(
                "Review must be at most {MAX_CONTENT_CHARS} characters"
            )));
        }

        Ok(sanitized)
    }

    pub fn validate_photos(photos: &[String]) -> Result<Vec<String>, AppError> {
        if photos.len() > MAX_PHOTOS {
            return Err(AppError::Validation(format!(
                "At most {MAX_PHOTOS} photos per review"
            )));
        }

        photos.iter().map(|p| Self::validate_photo_url(p)).collect()
    }

    fn validate_photo_url(photo: &str) -> Result<String, AppError> {
        validate_web_url(photo, "Photo")
    }
}

/// Normalizes an absolute http(s) URL; `label` names the field in error messages.
pub(crate) fn validate_web_url(raw: &str, label: &str) -> Result<String, AppError> {
    let raw = raw.trim();

    if raw.is_empty() || raw.len() > MAX_URL_LENGTH {
        return Err(AppError::Validation(format!("{label} URL is empty or too long")));
    }

    let parsed = url::Url::parse(raw)
        .map_err(|_| AppError::Validation(format!("{label} URL is not valid")))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(AppError::Validation(format!(
            "{label} URL must use http or https"
        )));
    }

    if parsed.host_str().is_none() {
        return Err(AppError::Validation(format!("{label} URL must have a host")));
    }

    Ok(parsed.to_string())
}
