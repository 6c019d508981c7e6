use super::review_validator::validate_web_url;
use crate::domain::{NewShop, ShopEdit};
use shopreview_errors::AppError;

pub const MAX_SHOP_NAME_CHARS: usize = 255;
pub const MAX_CATEGORY_CHARS: usize = 100;
pub const MAX_ADDRESS_CHARS: usize = 500;
const MAX_DESCRIPTION_CHARS: usize = 2000;
const MAX_PHONE_CHARS: usize = 50;
pub const MAX_TAGS: usize = 20;
const MAX_TAG_CHARS: usize = 50;
pub const MAX_SHOP_PHOTOS: usize = 10;

pub struct ShopValidator;

impl ShopValidator {
    /// Trims every text field and reports the first violation.
    pub fn validate_new(input: NewShop) -> Result<NewShop, AppError> {
        Ok(NewShop {
            name: required("Name", &input.name, MAX_SHOP_NAME_CHARS)?,
            description: input
                .description
                .as_deref()
                .map(|d| bounded("Description", d, MAX_DESCRIPTION_CHARS))
                .transpose()?
                .flatten(),
            category: required("Category", &input.category, MAX_CATEGORY_CHARS)?,
            address: required("Address", &input.address, MAX_ADDRESS_CHARS)?,
            coordinates: input.coordinates,
            tags: Self::validate_tags(&input.tags)?,
            operating_hours: input
                .operating_hours
                .as_deref()
                .map(|h| bounded("Operating hours", h, MAX_DESCRIPTION_CHARS))
                .transpose()?
                .flatten(),
            phone: input
                .phone
                .as_deref()
                .map(|p| bounded("Phone", p, MAX_PHONE_CHARS))
                .transpose()?
                .flatten(),
            website: input
                .website
                .as_deref()
                .map(|w| validate_web_url(w, "Website"))
                .transpose()?,
            photos: Self::validate_photos(&input.photos)?,
        })
    }

    /// Same rules as [`ShopValidator::validate_new`] on the present fields. An edit that
    /// changes nothing is rejected.
    pub fn validate_edit(edit: ShopEdit) -> Result<ShopEdit, AppError> {
        if edit.is_empty() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }

        Ok(ShopEdit {
            name: edit
                .name
                .as_deref()
                .map(|n| required("Name", n, MAX_SHOP_NAME_CHARS))
                .transpose()?,
            description: edit
                .description
                .as_deref()
                .map(|d| required("Description", d, MAX_DESCRIPTION_CHARS))
                .transpose()?,
            category: edit
                .category
                .as_deref()
                .map(|c| required("Category", c, MAX_CATEGORY_CHARS))
                .transpose()?,
            address: edit
                .address
                .as_deref()
                .map(|a| required("Address", a, MAX_ADDRESS_CHARS))
                .transpose()?,
            coordinates: edit.coordinates,
            tags: edit.tags.as_deref().map(Self::validate_tags).transpose()?,
            operating_hours: edit
                .operating_hours
                .as_deref()
                .map(|h| required("Operating hours", h, MAX_DESCRIPTION_CHARS))
                .transpose()?,
            phone: edit
                .phone
                .as_deref()
                .map(|p| required("Phone", p, MAX_PHONE_CHARS))
                .transpose()?,
            website: edit
                .website
                .as_deref()
                .map(|w| validate_web_url(w, "Website"))
                .transpose()?,
            photos: edit.photos.as_deref().map(Self::validate_photos).transpose()?,
        })
    }

    /// Trimmed, blank tags dropped, duplicates removed keeping the first.
    pub fn validate_tags(tags: &[String]) -> Result<Vec<String>, AppError> {
        let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let Some(tag) = bounded("Tag", tag, MAX_TAG_CHARS)? else {
                continue;
            };
            if !cleaned.contains(&tag) {
                cleaned.push(tag);
            }
        }

        if cleaned.len() > MAX_TAGS {
            return Err(AppError::Validation(format!("At most {MAX_TAGS} tags per shop")));
        }
        Ok(cleaned)
    }

    pub fn validate_photos(photos: &[String]) -> Result<Vec<String>, AppError> {
        if photos.len() > MAX_SHOP_PHOTOS {
            return Err(AppError::Validation(format!(
                "At most {MAX_SHOP_PHOTOS} photos per shop"
            )));
        }
        photos.iter().map(|p| validate_web_url(p, "Photo")).collect()
    }
}

fn required(label: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    bounded(label, value, max_chars)?
        .ok_or_else(|| AppError::Validation(format!("{label} is required")))
}

/// Trimmed value, `None` when blank.
fn bounded(label: &str, value: &str, max_chars: usize) -> Result<Option<String>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{label} must be at most {max_chars} characters"
        )));
    }
    Ok(Some(value.to_string()))
}
