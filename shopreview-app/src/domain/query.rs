use super::{ReviewListing, ReviewStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewSort {
    #[default]
    NewestFirst,
    OldestFirst,
    RatingDesc,
    RatingAsc,
    /// Upvotes minus downvotes, most helpful first.
    NetVotesDesc,
}

impl ReviewSort {
    fn compare(&self, a: &ReviewListing, b: &ReviewListing) -> Ordering {
        let (a, b) = (&a.review, &b.review);
        let newest_first = b.created_at.cmp(&a.created_at);
        match self {
            Self::NewestFirst => newest_first,
            Self::OldestFirst => a.created_at.cmp(&b.created_at),
            Self::RatingDesc => b.rating.total_cmp(&a.rating).then(newest_first),
            Self::RatingAsc => a.rating.total_cmp(&b.rating).then(newest_first),
            Self::NetVotesDesc => b.votes.net().cmp(&a.votes.net()).then(newest_first),
        }
    }
}

/// Filter and ordering for review listings. Missing fields match everything,
/// except `status`, which defaults to approved reviews only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    /// Star bucket: a 4.5 review falls in bucket 4.
    pub rating: Option<u8>,
    pub status: ReviewStatus,
    pub shop_id: Option<uuid::Uuid>,
    pub sort: ReviewSort,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            rating: None,
            status: ReviewStatus::Approved,
            shop_id: None,
            sort: ReviewSort::default(),
        }
    }
}

impl ReviewFilter {
    pub fn with_status(mut self, status: ReviewStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_sort(mut self, sort: ReviewSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_rating(mut self, bucket: u8) -> Self {
        self.rating = Some(bucket);
        self
    }

    pub fn matches(&self, listing: &ReviewListing) -> bool {
        let review = &listing.review;

        if review.status != self.status {
            return false;
        }

        if self.shop_id.is_some_and(|id| id != review.shop_id) {
            return false;
        }

        if let Some(category) = self.category.as_deref() {
            if listing.shop_category != category {
                return false;
            }
        }

        if let Some(bucket) = self.rating {
            if review.rating.floor() != f64::from(bucket) {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                listing.shop_name.to_lowercase().contains(&term)
                    || review.content.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }

    /// Filter then stable-sort. Pure; the input is not modified.
    pub fn apply<I>(&self, listings: I) -> Vec<ReviewListing>
    where
        I: IntoIterator<Item = ReviewListing>,
    {
        let mut matched: Vec<ReviewListing> =
            listings.into_iter().filter(|l| self.matches(l)).collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Review, VoteAggregate, VoteType};
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn listing(
        shop: &str,
        category: &str,
        rating: f64,
        content: &str,
        days_old: i64,
        status: ReviewStatus,
    ) -> ReviewListing {
        let created = Utc.with_ymd_and_hms(2024, 2, 25, 12, 0, 0).unwrap() - Duration::days(days_old);
        ReviewListing {
            review: Review {
                id: Uuid::new_v4(),
                shop_id: Uuid::new_v4(),
                author_id: Uuid::new_v4(),
                rating,
                content: content.to_string(),
                photos: Vec::new(),
                status,
                votes: VoteAggregate::default(),
                created_at: created,
                updated_at: created,
            },
            shop_name: shop.to_string(),
            shop_category: category.to_string(),
        }
    }

    fn ratings(listings: &[ReviewListing]) -> Vec<f64> {
        listings.iter().map(|l| l.review.rating).collect()
    }

    #[test]
    fn test_rating_desc_breaks_ties_newest_first() {
        let a = listing("Delicious Corner", "Food", 4.5, "Amazing food!", 3, ReviewStatus::Approved);
        let older = listing("Fashion Hub", "Fashion", 4.0, "Great selection", 2, ReviewStatus::Approved);
        let c = listing("Tech Zone", "Electronics", 5.0, "Excellent service", 1, ReviewStatus::Approved);
        let newer = listing("Fashion Hub", "Fashion", 4.0, "Helpful staff", 0, ReviewStatus::Approved);
        let newer_id = newer.review.id;
        let older_id = older.review.id;

        let filter = ReviewFilter::default().with_sort(ReviewSort::RatingDesc);
        let out = filter.apply(vec![a, older, c, newer]);

        assert_eq!(ratings(&out), vec![5.0, 4.5, 4.0, 4.0]);
        assert_eq!(out[2].review.id, newer_id);
        assert_eq!(out[3].review.id, older_id);
    }

    #[test]
    fn test_defaults_to_approved_newest_first() {
        let pending = listing("Tech Zone", "Electronics", 5.0, "Pending one", 0, ReviewStatus::Pending);
        let old = listing("Tech Zone", "Electronics", 3.0, "Old approved", 5, ReviewStatus::Approved);
        let new = listing("Tech Zone", "Electronics", 4.0, "New approved", 1, ReviewStatus::Approved);

        let out = ReviewFilter::default().apply(vec![pending, old, new]);

        assert_eq!(ratings(&out), vec![4.0, 3.0]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_shop_and_content() {
        let by_shop = listing("Delicious Corner", "Food", 4.0, "Nice place", 0, ReviewStatus::Approved);
        let by_content = listing("Tech Zone", "Electronics", 4.0, "Delicious coffee too", 1, ReviewStatus::Approved);
        let neither = listing("Fashion Hub", "Fashion", 4.0, "Good prices", 2, ReviewStatus::Approved);

        let out = ReviewFilter::default()
            .with_search("  DELICIOUS ")
            .apply(vec![by_shop, by_content, neither]);

        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|l| l.shop_name != "Fashion Hub"));

        let everything = ReviewFilter::default().with_search("   ");
        assert!(everything.matches(&listing("X", "Y", 1.0, "whatever", 0, ReviewStatus::Approved)));
    }

    #[test]
    fn test_category_and_rating_bucket() {
        let half = listing("Delicious Corner", "Food", 4.5, "Great", 0, ReviewStatus::Approved);
        let four = listing("Delicious Corner", "Food", 4.0, "Good", 1, ReviewStatus::Approved);
        let five = listing("Delicious Corner", "Food", 5.0, "Best", 2, ReviewStatus::Approved);
        let other = listing("Tech Zone", "Electronics", 4.0, "Fine", 3, ReviewStatus::Approved);

        let out = ReviewFilter::default()
            .with_category("Food")
            .with_rating(4)
            .apply(vec![half, four, five, other]);

        assert_eq!(ratings(&out), vec![4.5, 4.0]);
    }

    #[test]
    fn test_net_votes_desc_is_stable_on_ties() {
        let mut helpful = listing("A", "Food", 3.0, "helpful", 5, ReviewStatus::Approved);
        helpful.review.votes = VoteAggregate::from_votes([
            (Uuid::new_v4(), VoteType::Up),
            (Uuid::new_v4(), VoteType::Up),
        ]);
        let mut tie_old = listing("B", "Food", 3.0, "tie old", 4, ReviewStatus::Approved);
        tie_old.review.votes = VoteAggregate::from_votes([(Uuid::new_v4(), VoteType::Up)]);
        let mut tie_new = listing("C", "Food", 3.0, "tie new", 1, ReviewStatus::Approved);
        tie_new.review.votes = VoteAggregate::from_votes([
            (Uuid::new_v4(), VoteType::Up),
            (Uuid::new_v4(), VoteType::Up),
            (Uuid::new_v4(), VoteType::Down),
        ]);
        let mut disliked = listing("D", "Food", 3.0, "disliked", 0, ReviewStatus::Approved);
        disliked.review.votes = VoteAggregate::from_votes([(Uuid::new_v4(), VoteType::Down)]);

        let out = ReviewFilter::default()
            .with_sort(ReviewSort::NetVotesDesc)
            .apply(vec![tie_old, disliked, helpful, tie_new]);

        let names: Vec<&str> = out.iter().map(|l| l.shop_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_sort_names_on_the_wire() {
        let sort: ReviewSort = serde_json::from_str("\"net-votes-desc\"").unwrap();
        assert_eq!(sort, ReviewSort::NetVotesDesc);
        let sort: ReviewSort = serde_json::from_str("\"rating-asc\"").unwrap();
        assert_eq!(sort, ReviewSort::RatingAsc);
    }
}
