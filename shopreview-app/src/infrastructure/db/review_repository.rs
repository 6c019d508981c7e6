use super::entities::{review, review_vote, Review as ReviewRow, ReviewVote, Shop as ShopRow};
use super::{aggregate, counter, remote, review_from_row};
use crate::application::ReviewStore;
use crate::domain::{Review, ReviewListing, ReviewStatus, VoteAggregate, VoteChange, VoteType};
use crate::infrastructure::security::ValidatedEdit;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, SqlErr, TransactionTrait,
};
use shopreview_errors::AppError;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct ReviewRepository {
    db: DatabaseConnection,
}

impl ReviewRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn votes_of<C: ConnectionTrait>(
        conn: &C,
        review_id: Uuid,
    ) -> Result<Vec<review_vote::Model>, DbErr> {
        ReviewVote::find()
            .filter(review_vote::Column::ReviewId.eq(review_id))
            .all(conn)
            .await
    }

    async fn with_votes(&self, row: review::Model) -> Result<Review, AppError> {
        let votes = Self::votes_of(&self.db, row.id).await.map_err(remote)?;
        review_from_row(row, votes)
    }

    async fn row(&self, id: Uuid) -> Result<review::Model, AppError> {
        ReviewRow::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(remote)?
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("review {id}"))
}

#[async_trait]
impl ReviewStore for ReviewRepository {
    async fn insert(&self, review: Review) -> Result<Review, AppError> {
        let active = review::ActiveModel {
            id: Set(review.id),
            shop_id: Set(review.shop_id),
            user_id: Set(review.author_id),
            rating: Set(review.rating),
            content: Set(review.content.clone()),
            photos: Set(serde_json::json!(review.photos)),
            status: Set(review.status.as_str().to_string()),
            upvotes: Set(0),
            downvotes: Set(0),
            created_at: Set(review.created_at),
            updated_at: Set(review.updated_at),
        };

        active.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::NotFound(format!("shop {}", review.shop_id))
            }
            _ => remote(e),
        })?;

        Ok(review)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        let row = ReviewRow::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(remote)?;

        match row {
            Some(row) => self.with_votes(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn set_status(&self, id: Uuid, status: ReviewStatus) -> Result<Review, AppError> {
        let mut active: review::ActiveModel = self.row(id).await?.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let row = active.update(&self.db).await.map_err(remote)?;
        self.with_votes(row).await
    }

    async fn update_content(&self, id: Uuid, edit: &ValidatedEdit) -> Result<Review, AppError> {
        let mut active: review::ActiveModel = self.row(id).await?.into();
        if let Some(rating) = edit.rating {
            active.rating = Set(f64::from(rating));
        }
        if let Some(content) = &edit.content {
            active.content = Set(content.clone());
        }
        if let Some(photos) = &edit.photos {
            active.photos = Set(serde_json::json!(photos));
        }
        active.updated_at = Set(Utc::now());

        let row = active.update(&self.db).await.map_err(remote)?;
        self.with_votes(row).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        // review_votes rows go with it (on delete cascade)
        let result = ReviewRow::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(remote)?;

        if result.rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn toggle_vote(
        &self,
        review_id: Uuid,
        viewer_id: Uuid,
        vote: VoteType,
    ) -> Result<VoteAggregate, AppError> {
        let txn = self.db.begin().await.map_err(remote)?;

        // Row lock serializes toggles on the same review until commit.
        let row = ReviewRow::find_by_id(review_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(remote)?
            .ok_or_else(|| not_found(review_id))?;

        let existing = ReviewVote::find()
            .filter(review_vote::Column::ReviewId.eq(review_id))
            .filter(review_vote::Column::UserId.eq(viewer_id))
            .one(&txn)
            .await
            .map_err(remote)?;
        let previous = existing
            .as_ref()
            .map(|v| super::parse_vote(&v.vote_type))
            .transpose()?;

        let change = VoteChange::resolve(previous, vote);
        match change {
            VoteChange::Added { vote } => {
                review_vote::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    review_id: Set(review_id),
                    user_id: Set(viewer_id),
                    vote_type: Set(vote.as_str().to_string()),
                    created_at: Set(Utc::now()),
                }
                .insert(&txn)
                .await
                .map_err(remote)?;
            }
            VoteChange::Removed { .. } => {
                ReviewVote::delete_many()
                    .filter(review_vote::Column::ReviewId.eq(review_id))
                    .filter(review_vote::Column::UserId.eq(viewer_id))
                    .exec(&txn)
                    .await
                    .map_err(remote)?;
            }
            VoteChange::Switched { to, .. } => {
                ReviewVote::update_many()
                    .col_expr(review_vote::Column::VoteType, Expr::value(to.as_str()))
                    .filter(review_vote::Column::ReviewId.eq(review_id))
                    .filter(review_vote::Column::UserId.eq(viewer_id))
                    .exec(&txn)
                    .await
                    .map_err(remote)?;
            }
        }

        let votes = aggregate(Self::votes_of(&txn, review_id).await.map_err(remote)?)?;

        let mut active: review::ActiveModel = row.into();
        active.upvotes = Set(counter(votes.upvotes));
        active.downvotes = Set(counter(votes.downvotes));
        active.updated_at = Set(Utc::now());
        active.update(&txn).await.map_err(remote)?;

        txn.commit().await.map_err(remote)?;

        tracing::debug!(review_id = %review_id, ?change, "Vote row updated");
        Ok(votes)
    }

    async fn listings(
        &self,
        status: ReviewStatus,
        shop_id: Option<Uuid>,
    ) -> Result<Vec<ReviewListing>, AppError> {
        let mut query = ReviewRow::find().filter(review::Column::Status.eq(status.as_str()));
        if let Some(shop_id) = shop_id {
            query = query.filter(review::Column::ShopId.eq(shop_id));
        }

        let rows = query
            .find_also_related(ShopRow)
            .all(&self.db)
            .await
            .map_err(remote)?;

        let ids: Vec<Uuid> = rows.iter().map(|(r, _)| r.id).collect();
        let mut votes_by_review: HashMap<Uuid, Vec<review_vote::Model>> = HashMap::new();
        if !ids.is_empty() {
            let votes = ReviewVote::find()
                .filter(review_vote::Column::ReviewId.is_in(ids))
                .all(&self.db)
                .await
                .map_err(remote)?;
            for vote in votes {
                votes_by_review.entry(vote.review_id).or_default().push(vote);
            }
        }

        let mut listings = Vec::with_capacity(rows.len());
        for (row, shop) in rows {
            let Some(shop) = shop else {
                tracing::warn!(review_id = %row.id, "Skipping review whose shop is gone");
                continue;
            };
            let votes = votes_by_review.remove(&row.id).unwrap_or_default();
            listings.push(ReviewListing {
                review: review_from_row(row, votes)?,
                shop_name: shop.name,
                shop_category: shop.category,
            });
        }

        Ok(listings)
    }
}
