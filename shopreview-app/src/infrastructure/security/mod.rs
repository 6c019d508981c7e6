mod review_validator;
mod shop_validator;

pub use review_validator::{
    ReviewValidator, ValidatedEdit, ValidatedReview, MAX_CONTENT_CHARS, MAX_PHOTOS,
    MAX_RATING, MIN_CONTENT_CHARS, MIN_RATING,
};
pub use shop_validator::{ShopValidator, MAX_SHOP_PHOTOS, MAX_TAGS};
