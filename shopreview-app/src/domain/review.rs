use super::VoteAggregate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown review status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approve,
    Reject,
}

impl ModerationDecision {
    pub fn status(&self) -> ReviewStatus {
        match self {
            Self::Approve => ReviewStatus::Approved,
            Self::Reject => ReviewStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: uuid::Uuid,
    pub shop_id: uuid::Uuid,
    pub author_id: uuid::Uuid,
    /// Whole stars for new reviews; imported reviews may carry halves.
    pub rating: f64,
    pub content: String,
    pub photos: Vec<String>,
    pub status: ReviewStatus,
    pub votes: VoteAggregate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// A freshly submitted review: pending, no votes.
    pub fn new(
        shop_id: uuid::Uuid,
        author_id: uuid::Uuid,
        rating: u8,
        content: String,
        photos: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            shop_id,
            author_id,
            rating: f64::from(rating),
            content,
            photos,
            status: ReviewStatus::Pending,
            votes: VoteAggregate::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, user_id: uuid::Uuid) -> bool {
        self.author_id == user_id
    }
}

/// Input for submitting a review. The author comes from the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub shop_id: uuid::Uuid,
    pub rating: i32,
    pub content: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Author edit; absent fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewEdit {
    pub rating: Option<i32>,
    pub content: Option<String>,
    pub photos: Option<Vec<String>>,
}

/// Review with the shop fields needed for search and display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewListing {
    #[serde(flatten)]
    pub review: Review,
    pub shop_name: String,
    pub shop_category: String,
}
