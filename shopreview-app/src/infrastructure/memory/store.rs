use crate::application::{ReviewStore, ShopCatalog};
use crate::domain::{
    Coordinates, Review, ReviewListing, ReviewStatus, Shop, VoteAggregate, VoteType,
};
use crate::infrastructure::security::ValidatedEdit;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use shopreview_errors::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Process-local data store for tests and database-less runs.
///
/// Each review lives in its own dashmap entry; a vote toggle holds that entry's lock
/// for the whole read-modify-write, which serializes concurrent voters on one review.
#[derive(Clone)]
pub struct InMemoryStore {
    reviews: Arc<DashMap<Uuid, Review>>,
    shops: Arc<DashMap<Uuid, Shop>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            reviews: Arc::new(DashMap::new()),
            shops: Arc::new(DashMap::new()),
        }
    }

    pub fn add_shop(&self, shop: Shop) -> Uuid {
        let id = shop.id;
        self.shops.insert(id, shop);
        id
    }

    /// Seeds a review as-is (any status, any votes), bypassing submission.
    pub fn add_review(&self, review: Review) -> Uuid {
        let id = review.id;
        self.reviews.insert(id, review);
        id
    }

    fn listing(&self, review: &Review) -> Option<ReviewListing> {
        let shop = self.shops.get(&review.shop_id)?;
        Some(ReviewListing {
            review: review.clone(),
            shop_name: shop.name.clone(),
            shop_category: shop.category.clone(),
        })
    }

    fn sorted_by_name(mut shops: Vec<Shop>) -> Vec<Shop> {
        shops.sort_by(|a, b| a.name.cmp(&b.name));
        shops
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn review_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("review {id}"))
}

fn shop_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("shop {id}"))
}

#[async_trait]
impl ReviewStore for InMemoryStore {
    async fn insert(&self, review: Review) -> Result<Review, AppError> {
        if !self.shops.contains_key(&review.shop_id) {
            return Err(shop_not_found(review.shop_id));
        }
        self.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        Ok(self.reviews.get(&id).map(|r| r.clone()))
    }

    async fn set_status(&self, id: Uuid, status: ReviewStatus) -> Result<Review, AppError> {
        let mut review = self.reviews.get_mut(&id).ok_or_else(|| review_not_found(id))?;
        review.status = status;
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn update_content(&self, id: Uuid, edit: &ValidatedEdit) -> Result<Review, AppError> {
        let mut review = self.reviews.get_mut(&id).ok_or_else(|| review_not_found(id))?;
        if let Some(rating) = edit.rating {
            review.rating = f64::from(rating);
        }
        if let Some(content) = &edit.content {
            review.content = content.clone();
        }
        if let Some(photos) = &edit.photos {
            review.photos = photos.clone();
        }
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.reviews
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| review_not_found(id))
    }

    async fn toggle_vote(
        &self,
        review_id: Uuid,
        viewer_id: Uuid,
        vote: VoteType,
    ) -> Result<VoteAggregate, AppError> {
        let mut review = self
            .reviews
            .get_mut(&review_id)
            .ok_or_else(|| review_not_found(review_id))?;
        review.votes.toggle(viewer_id, vote);
        review.updated_at = Utc::now();
        Ok(review.votes.clone())
    }

    async fn listings(
        &self,
        status: ReviewStatus,
        shop_id: Option<Uuid>,
    ) -> Result<Vec<ReviewListing>, AppError> {
        let reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|r| r.status == status && shop_id.map_or(true, |id| r.shop_id == id))
            .map(|r| r.value().clone())
            .collect();

        Ok(reviews.iter().filter_map(|r| self.listing(r)).collect())
    }
}

#[async_trait]
impl ShopCatalog for InMemoryStore {
    async fn list(&self, category: Option<&str>) -> Result<Vec<Shop>, AppError> {
        let shops = self
            .shops
            .iter()
            .filter(|s| category.map_or(true, |c| s.category == c))
            .map(|s| s.value().clone())
            .collect();
        Ok(Self::sorted_by_name(shops))
    }

    async fn search(&self, query: &str) -> Result<Vec<Shop>, AppError> {
        let shops = self
            .shops
            .iter()
            .filter(|s| s.matches_search(query))
            .map(|s| s.value().clone())
            .collect();
        Ok(Self::sorted_by_name(shops))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Shop>, AppError> {
        Ok(self.shops.get(&id).map(|s| s.clone()))
    }

    async fn nearby(&self, center: Coordinates, radius_meters: f64) -> Result<Vec<Shop>, AppError> {
        let mut within: Vec<(f64, Shop)> = self
            .shops
            .iter()
            .map(|s| (center.distance_meters(&s.coordinates), s.value().clone()))
            .filter(|(distance, _)| *distance <= radius_meters)
            .collect();
        within.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(within.into_iter().map(|(_, shop)| shop).collect())
    }

    async fn insert_shop(&self, shop: Shop) -> Result<Shop, AppError> {
        self.shops.insert(shop.id, shop.clone());
        Ok(shop)
    }

    async fn update_shop(&self, shop: Shop) -> Result<Shop, AppError> {
        let mut stored = self.shops.get_mut(&shop.id).ok_or_else(|| shop_not_found(shop.id))?;
        *stored = shop.clone();
        Ok(shop)
    }

    async fn delete_shop(&self, id: Uuid) -> Result<(), AppError> {
        self.shops.remove(&id).ok_or_else(|| shop_not_found(id))?;
        self.reviews.retain(|_, review| review.shop_id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop(name: &str, category: &str, lat: f64, lng: f64) -> Shop {
        Shop::new(
            name.to_string(),
            category.to_string(),
            "Jalan Example, Kuala Lumpur".to_string(),
            Coordinates::new(lat, lng).unwrap(),
        )
    }

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.add_shop(
            shop("Tech Zone", "Electronics", 3.1380, 101.6871)
                .with_description(Some("Latest gadgets and electronics.".into())),
        );
        store.add_shop(
            shop("Delicious Corner", "Food", 3.1390, 101.6869)
                .with_description(Some("Traditional street food with a modern twist.".into())),
        );
        store.add_shop(shop("Fashion Hub", "Fashion", 3.1421, 101.6867));
        store.add_shop(shop("Penang Laksa House", "Food", 5.4141, 100.3288));
        store
    }

    fn names(shops: &[Shop]) -> Vec<&str> {
        shops.iter().map(|s| s.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_orders_by_name_and_filters_category() {
        let store = seeded();

        let all = store.list(None).await.unwrap();
        assert_eq!(
            names(&all),
            vec!["Delicious Corner", "Fashion Hub", "Penang Laksa House", "Tech Zone"]
        );

        let food = store.list(Some("Food")).await.unwrap();
        assert_eq!(names(&food), vec!["Delicious Corner", "Penang Laksa House"]);
    }

    #[tokio::test]
    async fn test_search_matches_name_or_description() {
        let store = seeded();
        let hits = store.search("GADGET").await.unwrap();
        assert_eq!(names(&hits), vec!["Tech Zone"]);

        let hits = store.search("corner").await.unwrap();
        assert_eq!(names(&hits), vec!["Delicious Corner"]);
    }

    #[tokio::test]
    async fn test_nearby_is_nearest_first_within_radius() {
        let store = seeded();
        let center = Coordinates::new(3.1390, 101.6869).unwrap();

        let near = store.nearby(center, 5000.0).await.unwrap();
        assert_eq!(names(&near), vec!["Delicious Corner", "Tech Zone", "Fashion Hub"]);

        let tight = store.nearby(center, 200.0).await.unwrap();
        assert_eq!(names(&tight), vec!["Delicious Corner", "Tech Zone"]);
    }

    #[tokio::test]
    async fn test_concurrent_voters_keep_counters_consistent() {
        let store = seeded();
        let shop_id = store.list(Some("Electronics")).await.unwrap()[0].id;
        let review = Review::new(shop_id, Uuid::new_v4(), 5, "Excellent service".into(), Vec::new());
        let review_id = store.add_review(review);

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let vote = if i % 3 == 0 { VoteType::Down } else { VoteType::Up };
                store.toggle_vote(review_id, Uuid::new_v4(), vote).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let votes = ReviewStore::find(&store, review_id).await.unwrap().unwrap().votes;
        assert!(votes.is_consistent());
        assert_eq!(votes.upvotes + votes.downvotes, 32);
        assert_eq!(votes.downvotes, 11);
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_shop() {
        let store = seeded();
        let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), 4, "Nice enough place".into(), Vec::new());
        assert!(matches!(store.insert(review).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_shop_writes() {
        let store = seeded();
        let shop = store
            .insert_shop(shop("Kopi Corner", "Food", 3.1319, 101.6711))
            .await
            .unwrap();
        assert_eq!(store.list(Some("Food")).await.unwrap().len(), 3);

        let mut renamed = shop.clone();
        renamed.name = "Kopi Corner Bangsar".into();
        store.update_shop(renamed).await.unwrap();
        let stored = ShopCatalog::find(&store, shop.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Kopi Corner Bangsar");

        let missing = self::shop("Gone", "Food", 3.0, 101.0);
        assert!(matches!(store.update_shop(missing).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_shop_removes_its_reviews() {
        let store = seeded();
        let shops = store.list(None).await.unwrap();
        let (doomed, kept) = (shops[0].id, shops[1].id);
        let doomed_review = store.add_review(Review::new(doomed, Uuid::new_v4(), 4, "Worth the queue".into(), Vec::new()));
        let kept_review = store.add_review(Review::new(kept, Uuid::new_v4(), 3, "Decent enough stop".into(), Vec::new()));

        store.delete_shop(doomed).await.unwrap();

        assert!(ShopCatalog::find(&store, doomed).await.unwrap().is_none());
        assert!(ReviewStore::find(&store, doomed_review).await.unwrap().is_none());
        assert!(ReviewStore::find(&store, kept_review).await.unwrap().is_some());
        assert!(matches!(store.delete_shop(doomed).await, Err(AppError::NotFound(_))));
    }
}
