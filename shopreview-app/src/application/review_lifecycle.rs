use super::{IdentityProvider, ReviewStore};
use crate::domain::{
    ModerationDecision, NewReview, Review, ReviewEdit, ReviewFilter, ReviewListing,
    ReviewSort, ReviewStatus, Session, VoteAggregate, VoteType,
};
use crate::infrastructure::security::ReviewValidator;
use shopreview_errors::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Submission, moderation and voting for reviews.
///
/// Every operation takes the caller's session explicitly. A failed store call is
/// returned as-is and nothing is retried.
#[derive(Clone)]
pub struct ReviewLifecycle {
    store: Arc<dyn ReviewStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ReviewLifecycle {
    pub fn new(store: Arc<dyn ReviewStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    pub async fn submit(
        &self,
        session: Option<&Session>,
        input: NewReview,
    ) -> Result<Review, AppError> {
        let session = require_session(session)?;
        let valid = ReviewValidator::validate_new(&input)?;

        let review = Review::new(
            input.shop_id,
            session.user_id,
            valid.rating,
            valid.content,
            valid.photos,
        );
        let saved = self.store.insert(review).await?;

        tracing::info!(
            review_id = %saved.id,
            shop_id = %saved.shop_id,
            author_id = %saved.author_id,
            "Review submitted for moderation"
        );
        Ok(saved)
    }

    /// Re-moderating an already decided review is accepted and just sets the status again.
    pub async fn moderate(
        &self,
        session: Option<&Session>,
        review_id: Uuid,
        decision: ModerationDecision,
    ) -> Result<Review, AppError> {
        let moderator = self.require_moderator(session).await?;
        let review = self.store.set_status(review_id, decision.status()).await?;

        tracing::info!(
            review_id = %review_id,
            moderator_id = %moderator.user_id,
            status = %review.status,
            "Review moderated"
        );
        Ok(review)
    }

    /// Same visibility as [`get`](Self::get): a review the caller cannot see cannot be
    /// voted on either.
    pub async fn vote(
        &self,
        session: Option<&Session>,
        review_id: Uuid,
        vote: VoteType,
    ) -> Result<VoteAggregate, AppError> {
        let session = require_session(session)?;
        self.find_visible(Some(session), review_id).await?;
        let votes = self
            .store
            .toggle_vote(review_id, session.user_id, vote)
            .await?;

        tracing::debug!(
            review_id = %review_id,
            viewer_id = %session.user_id,
            upvotes = votes.upvotes,
            downvotes = votes.downvotes,
            "Vote toggled"
        );
        Ok(votes)
    }

    /// Filtered and sorted listings. Reads only; no access check.
    pub async fn list(&self, filter: &ReviewFilter) -> Result<Vec<ReviewListing>, AppError> {
        let rows = self.store.listings(filter.status, filter.shop_id).await?;
        Ok(filter.apply(rows))
    }

    /// Like [`list`](Self::list), but listing anything other than approved reviews
    /// requires the moderator capability.
    pub async fn list_for(
        &self,
        session: Option<&Session>,
        filter: &ReviewFilter,
    ) -> Result<Vec<ReviewListing>, AppError> {
        if filter.status != ReviewStatus::Approved {
            self.require_moderator(session).await?;
        }
        self.list(filter).await
    }

    /// Pending reviews, oldest first.
    pub async fn moderation_queue(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<ReviewListing>, AppError> {
        let filter = ReviewFilter::default()
            .with_status(ReviewStatus::Pending)
            .with_sort(ReviewSort::OldestFirst);
        self.list_for(session, &filter).await
    }

    /// Approved reviews are public. Authors also see their own reviews and moderators
    /// see every review. Anything else looks like a missing review.
    pub async fn get(&self, session: Option<&Session>, review_id: Uuid) -> Result<Review, AppError> {
        self.find_visible(session, review_id).await
    }

    pub async fn viewer_vote(
        &self,
        session: Option<&Session>,
        review_id: Uuid,
    ) -> Result<Option<VoteType>, AppError> {
        let session = require_session(session)?;
        let review = self.find_visible(Some(session), review_id).await?;
        Ok(review.votes.vote_of(session.user_id))
    }

    /// Moderator-only. Granting an existing moderator again just refreshes the email.
    pub async fn grant_moderator(
        &self,
        session: Option<&Session>,
        user_id: Uuid,
        email: Option<String>,
    ) -> Result<(), AppError> {
        let granter = self.require_moderator(session).await?;
        self.identity.add_moderator(user_id, email).await?;

        tracing::info!(user_id = %user_id, granted_by = %granter.user_id, "Moderator granted");
        Ok(())
    }

    /// Author-only edit. The status stays as it is.
    pub async fn edit(
        &self,
        session: Option<&Session>,
        review_id: Uuid,
        edit: ReviewEdit,
    ) -> Result<Review, AppError> {
        let session = require_session(session)?;
        self.require_author(session, review_id).await?;

        let valid = ReviewValidator::validate_edit(&edit)?;
        if valid.is_empty() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }

        let review = self.store.update_content(review_id, &valid).await?;
        tracing::info!(review_id = %review_id, "Review edited by author");
        Ok(review)
    }

    pub async fn delete(&self, session: Option<&Session>, review_id: Uuid) -> Result<(), AppError> {
        let session = require_session(session)?;
        self.require_author(session, review_id).await?;

        self.store.delete(review_id).await?;
        tracing::info!(review_id = %review_id, "Review deleted by author");
        Ok(())
    }

    async fn find_existing(&self, review_id: Uuid) -> Result<Review, AppError> {
        self.store
            .find(review_id)
            .await?
            .ok_or_else(|| not_found(review_id))
    }

    async fn find_visible(
        &self,
        session: Option<&Session>,
        review_id: Uuid,
    ) -> Result<Review, AppError> {
        let review = self.find_existing(review_id).await?;

        if review.status == ReviewStatus::Approved {
            return Ok(review);
        }

        if let Some(session) = session {
            if review.is_authored_by(session.user_id)
                || self.identity.is_moderator(session.user_id).await?
            {
                return Ok(review);
            }
        }

        Err(not_found(review_id))
    }

    async fn require_author(&self, session: &Session, review_id: Uuid) -> Result<Review, AppError> {
        let review = self.find_existing(review_id).await?;
        if !review.is_authored_by(session.user_id) {
            return Err(AppError::Forbidden(
                "Only the author can change this review".to_string(),
            ));
        }
        Ok(review)
    }

    async fn require_moderator<'a>(
        &self,
        session: Option<&'a Session>,
    ) -> Result<&'a Session, AppError> {
        let session = require_session(session)?;
        if !self.identity.is_moderator(session.user_id).await? {
            tracing::warn!(user_id = %session.user_id, "Moderation attempted without capability");
            return Err(AppError::Forbidden("Moderator capability required".to_string()));
        }
        Ok(session)
    }
}

fn require_session(session: Option<&Session>) -> Result<&Session, AppError> {
    session.ok_or(AppError::Unauthenticated)
}

fn not_found(review_id: Uuid) -> AppError {
    AppError::NotFound(format!("review {review_id}"))
}
