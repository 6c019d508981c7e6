//! Seams to the external collaborators: the data store and the identity provider.
//!
//! Every method is a suspension point. Implementations either apply a call completely or
//! return an error and leave state untouched.

use crate::domain::{
    Coordinates, Review, ReviewListing, ReviewStatus, Shop, VoteAggregate, VoteType,
};
use crate::infrastructure::security::ValidatedEdit;
use async_trait::async_trait;
use shopreview_errors::AppError;
use uuid::Uuid;

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert(&self, review: Review) -> Result<Review, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Review>, AppError>;

    /// Sets the status and bumps `updated_at`.
    async fn set_status(&self, id: Uuid, status: ReviewStatus) -> Result<Review, AppError>;

    /// Applies the present fields of an author edit and bumps `updated_at`.
    async fn update_content(&self, id: Uuid, edit: &ValidatedEdit) -> Result<Review, AppError>;

    /// Removes the review together with its votes.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Toggles one viewer's vote. Must be atomic per review: concurrent toggles from
    /// different viewers never lose an update, and the returned aggregate's counters
    /// match its vote map.
    async fn toggle_vote(
        &self,
        review_id: Uuid,
        viewer_id: Uuid,
        vote: VoteType,
    ) -> Result<VoteAggregate, AppError>;

    /// Reviews in `status`, joined with their shop, in no particular order.
    async fn listings(
        &self,
        status: ReviewStatus,
        shop_id: Option<Uuid>,
    ) -> Result<Vec<ReviewListing>, AppError>;
}

#[async_trait]
pub trait ShopCatalog: Send + Sync {
    /// All shops, optionally restricted to one category, ordered by name.
    async fn list(&self, category: Option<&str>) -> Result<Vec<Shop>, AppError>;

    async fn search(&self, query: &str) -> Result<Vec<Shop>, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Shop>, AppError>;

    /// Shops within `radius_meters` of `center`, nearest first.
    async fn nearby(&self, center: Coordinates, radius_meters: f64) -> Result<Vec<Shop>, AppError>;

    async fn insert_shop(&self, shop: Shop) -> Result<Shop, AppError>;

    /// Replaces the stored row with `shop`. NotFound when it no longer exists.
    async fn update_shop(&self, shop: Shop) -> Result<Shop, AppError>;

    /// Removes the shop together with its reviews and their votes.
    async fn delete_shop(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn is_moderator(&self, user_id: Uuid) -> Result<bool, AppError>;

    /// Idempotent; a repeated grant refreshes the stored email.
    async fn add_moderator(&self, user_id: Uuid, email: Option<String>) -> Result<(), AppError>;
}
