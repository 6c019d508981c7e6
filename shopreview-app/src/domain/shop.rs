use super::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Radius used for "shops near me" when the caller does not pass one.
pub const DEFAULT_NEARBY_RADIUS_METERS: f64 = 5000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: uuid::Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub verified: bool,
    /// Maintained by the data store from approved reviews.
    pub rating: f64,
    pub review_count: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub operating_hours: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub owner_id: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller input for registering a shop. The owner is the signed-in caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShop {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub address: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub tags: Vec<String>,
    pub operating_hours: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Partial shop update; absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub tags: Option<Vec<String>>,
    pub operating_hours: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub photos: Option<Vec<String>>,
}

impl ShopEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.address.is_none()
            && self.coordinates.is_none()
            && self.tags.is_none()
            && self.operating_hours.is_none()
            && self.phone.is_none()
            && self.website.is_none()
            && self.photos.is_none()
    }
}

impl Shop {
    pub fn new(name: String, category: String, address: String, coordinates: Coordinates) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            name,
            description: None,
            category,
            address,
            coordinates,
            verified: false,
            rating: 0.0,
            review_count: 0,
            tags: Vec::new(),
            operating_hours: None,
            phone: None,
            website: None,
            photos: Vec::new(),
            owner_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Shop registered by `owner_id` from caller input.
    pub fn register(new: NewShop, owner_id: uuid::Uuid) -> Self {
        let mut shop = Self::new(new.name, new.category, new.address, new.coordinates)
            .with_description(new.description)
            .with_tags(new.tags);
        shop.operating_hours = new.operating_hours;
        shop.phone = new.phone;
        shop.website = new.website;
        shop.photos = new.photos;
        shop.owner_id = Some(owner_id);
        shop
    }

    pub fn is_owned_by(&self, user_id: uuid::Uuid) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Applies the present fields of `edit` and bumps `updated_at`.
    pub fn apply(&mut self, edit: ShopEdit) {
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(description) = edit.description {
            self.description = Some(description);
        }
        if let Some(category) = edit.category {
            self.category = category;
        }
        if let Some(address) = edit.address {
            self.address = address;
        }
        if let Some(coordinates) = edit.coordinates {
            self.coordinates = coordinates;
        }
        if let Some(tags) = edit.tags {
            self.tags = tags;
        }
        if let Some(hours) = edit.operating_hours {
            self.operating_hours = Some(hours);
        }
        if let Some(phone) = edit.phone {
            self.phone = Some(phone);
        }
        if let Some(website) = edit.website {
            self.website = Some(website);
        }
        if let Some(photos) = edit.photos {
            self.photos = photos;
        }
        self.updated_at = Utc::now();
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
    }
}
