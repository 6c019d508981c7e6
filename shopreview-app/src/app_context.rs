use crate::application::{
    IdentityProvider, ReviewLifecycle, ReviewStore, ShopCatalog, ShopDirectory,
};
#[cfg(feature = "server")]
use crate::config::AppConfig;
use crate::infrastructure::auth::SessionVerifier;
use crate::infrastructure::memory::{InMemoryIdentity, InMemoryStore};
#[cfg(feature = "server")]
use shopreview_errors::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub reviews: Arc<ReviewLifecycle>,
    pub shops: Arc<ShopDirectory>,
    pub sessions: SessionVerifier,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        shops: Arc<dyn ShopCatalog>,
        identity: Arc<dyn IdentityProvider>,
        sessions: SessionVerifier,
    ) -> Self {
        Self {
            reviews: Arc::new(ReviewLifecycle::new(store, identity.clone())),
            shops: Arc::new(ShopDirectory::new(shops, identity)),
            sessions,
        }
    }

    pub fn in_memory(store: InMemoryStore, identity: InMemoryIdentity, jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::new(identity),
            SessionVerifier::new(jwt_secret),
        )
    }

    /// Postgres when `DATABASE_URL` is set, otherwise an empty in-memory store.
    #[cfg(feature = "server")]
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        use crate::infrastructure::db::{
            create_connection, run_migrations, AdminRepository, ReviewRepository, ShopRepository,
        };

        let Some(database_url) = config.database_url.as_deref() else {
            tracing::info!("Using in-memory data store");
            return Ok(Self::in_memory(
                InMemoryStore::new(),
                InMemoryIdentity::new(),
                &config.jwt_secret,
            ));
        };

        let db = create_connection(database_url)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to database: {e}")))?;
        tracing::info!("Connected to database");

        if config.run_migrations {
            run_migrations(&db)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to run migrations: {e}")))?;
            tracing::info!("Migrations applied");
        }

        Ok(Self::new(
            Arc::new(ReviewRepository::new(db.clone())),
            Arc::new(ShopRepository::new(db.clone())),
            Arc::new(AdminRepository::new(db)),
            SessionVerifier::new(&config.jwt_secret),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, NewReview, NewShop, ReviewFilter, Session};

    #[tokio::test]
    async fn test_in_memory_context_shares_one_store() {
        let store = InMemoryStore::new();
        let ctx = AppContext::in_memory(store, InMemoryIdentity::new(), "local-secret");
        let owner = Session::new(uuid::Uuid::new_v4());

        let shop = ctx
            .shops
            .create(
                Some(&owner),
                NewShop {
                    name: "Kopi Corner".into(),
                    description: None,
                    category: "Food".into(),
                    address: "Jalan Telawi, Bangsar".into(),
                    coordinates: Coordinates::new(3.1319, 101.6711).unwrap(),
                    tags: Vec::new(),
                    operating_hours: None,
                    phone: None,
                    website: None,
                    photos: Vec::new(),
                },
            )
            .await
            .unwrap();

        let review = ctx
            .reviews
            .submit(
                Some(&owner),
                NewReview {
                    shop_id: shop.id,
                    rating: 5,
                    content: "Best flat white in town".into(),
                    photos: Vec::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(review.shop_id, shop.id);
        assert!(ctx.reviews.list(&ReviewFilter::default()).await.unwrap().is_empty());
    }
}
