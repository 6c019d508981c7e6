use super::{IdentityProvider, ShopCatalog};
use crate::domain::{Coordinates, NewShop, Session, Shop, ShopEdit};
use crate::infrastructure::security::ShopValidator;
use shopreview_errors::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Shop browsing for everyone and shop upkeep for owners and moderators.
#[derive(Clone)]
pub struct ShopDirectory {
    catalog: Arc<dyn ShopCatalog>,
    identity: Arc<dyn IdentityProvider>,
}

impl ShopDirectory {
    pub fn new(catalog: Arc<dyn ShopCatalog>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { catalog, identity }
    }

    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Shop>, AppError> {
        self.catalog.list(category).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Shop>, AppError> {
        self.catalog.search(query).await
    }

    pub async fn nearby(&self, center: Coordinates, radius_meters: f64) -> Result<Vec<Shop>, AppError> {
        self.catalog.nearby(center, radius_meters).await
    }

    pub async fn get(&self, shop_id: Uuid) -> Result<Shop, AppError> {
        self.catalog
            .find(shop_id)
            .await?
            .ok_or_else(|| not_found(shop_id))
    }

    /// Any signed-in user may register a shop and becomes its owner.
    pub async fn create(&self, session: Option<&Session>, input: NewShop) -> Result<Shop, AppError> {
        let session = session.ok_or(AppError::Unauthenticated)?;
        let valid = ShopValidator::validate_new(input)?;

        let shop = self
            .catalog
            .insert_shop(Shop::register(valid, session.user_id))
            .await?;

        tracing::info!(shop_id = %shop.id, owner_id = %session.user_id, "Shop registered");
        Ok(shop)
    }

    pub async fn update(
        &self,
        session: Option<&Session>,
        shop_id: Uuid,
        edit: ShopEdit,
    ) -> Result<Shop, AppError> {
        let mut shop = self.require_manager(session, shop_id).await?;
        let valid = ShopValidator::validate_edit(edit)?;

        shop.apply(valid);
        let shop = self.catalog.update_shop(shop).await?;

        tracing::info!(shop_id = %shop_id, "Shop updated");
        Ok(shop)
    }

    /// Removes the shop and every review written about it.
    pub async fn delete(&self, session: Option<&Session>, shop_id: Uuid) -> Result<(), AppError> {
        self.require_manager(session, shop_id).await?;
        self.catalog.delete_shop(shop_id).await?;

        tracing::info!(shop_id = %shop_id, "Shop deleted");
        Ok(())
    }

    /// The shop's owner or a moderator.
    async fn require_manager(&self, session: Option<&Session>, shop_id: Uuid) -> Result<Shop, AppError> {
        let session = session.ok_or(AppError::Unauthenticated)?;
        let shop = self.get(shop_id).await?;

        if shop.is_owned_by(session.user_id) || self.identity.is_moderator(session.user_id).await? {
            return Ok(shop);
        }

        tracing::warn!(user_id = %session.user_id, shop_id = %shop_id, "Shop change attempted by non-owner");
        Err(AppError::Forbidden(
            "Only the owner or a moderator can change this shop".to_string(),
        ))
    }
}

fn not_found(shop_id: Uuid) -> AppError {
    AppError::NotFound(format!("shop {shop_id}"))
}
