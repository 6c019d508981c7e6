pub mod admin;
pub mod review;
pub mod review_vote;
pub mod shop;

pub use admin::Entity as Admin;
pub use review::Entity as Review;
pub use review_vote::Entity as ReviewVote;
pub use shop::Entity as Shop;
