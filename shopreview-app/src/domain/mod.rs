mod coordinates;
mod optimistic;
mod query;
mod review;
mod session;
mod shop;
mod vote;

pub use coordinates::{Coordinates, CoordinatesError};
pub use optimistic::OptimisticVote;
pub use query::{ReviewFilter, ReviewSort};
pub use review::{ModerationDecision, NewReview, Review, ReviewEdit, ReviewListing, ReviewStatus};
pub use session::Session;
pub use shop::{NewShop, Shop, ShopEdit, DEFAULT_NEARBY_RADIUS_METERS};
pub use vote::{VoteAggregate, VoteChange, VoteResult, VoteType};
