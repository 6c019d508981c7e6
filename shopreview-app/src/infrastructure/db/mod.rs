pub mod entities;
mod admin_repository;
mod review_repository;
mod shop_repository;

pub use admin_repository::AdminRepository;
pub use review_repository::ReviewRepository;
pub use shop_repository::ShopRepository;

use crate::domain::{Coordinates, Review, ReviewStatus, Shop, VoteAggregate, VoteType};
use sea_orm::{
    ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    Statement,
};
use shopreview_errors::AppError;
use std::time::Duration;
use uuid::Uuid;

pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    Database::connect(opt).await
}

const INITIAL_MIGRATION: &str = include_str!("../../../../migrations/001_initial.sql");

fn migration_statements(migration: &str) -> impl Iterator<Item = &str> {
    migration
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
}

/// Applies `migrations/001_initial.sql` statement by statement and stops at the first
/// failure. Every statement is idempotent, so a failed run can simply be repeated.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    for (index, statement) in migration_statements(INITIAL_MIGRATION).enumerate() {
        db.execute(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            statement.to_string(),
        ))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, statement = index + 1, "Migration statement failed");
            e
        })?;
    }

    Ok(())
}

pub(crate) fn remote(err: DbErr) -> AppError {
    tracing::error!(error = %err, "Data store call failed");
    AppError::Remote(err.to_string())
}

fn parse_vote(vote_type: &str) -> Result<VoteType, AppError> {
    vote_type.parse().map_err(AppError::Remote)
}

fn counter(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn json_strings(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Null => Vec::new(),
        other => serde_json::from_value(other).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring malformed string list column");
            Vec::new()
        }),
    }
}

fn aggregate(votes: Vec<entities::review_vote::Model>) -> Result<VoteAggregate, AppError> {
    let votes = votes
        .into_iter()
        .map(|v| Ok((v.user_id, parse_vote(&v.vote_type)?)))
        .collect::<Result<Vec<(Uuid, VoteType)>, AppError>>()?;
    Ok(VoteAggregate::from_votes(votes))
}

fn review_from_row(
    row: entities::review::Model,
    votes: Vec<entities::review_vote::Model>,
) -> Result<Review, AppError> {
    let status: ReviewStatus = row.status.parse().map_err(AppError::Remote)?;
    Ok(Review {
        id: row.id,
        shop_id: row.shop_id,
        author_id: row.user_id,
        rating: row.rating,
        content: row.content,
        photos: json_strings(row.photos),
        status,
        votes: aggregate(votes)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn shop_from_row(row: entities::shop::Model) -> Result<Shop, AppError> {
    let coordinates = Coordinates::from_json(&row.coordinates)
        .map_err(|e| AppError::Remote(format!("shop {}: {e}", row.id)))?;
    Ok(Shop {
        id: row.id,
        name: row.name,
        description: row.description,
        category: row.category,
        address: row.address,
        coordinates,
        verified: row.verified,
        rating: row.rating,
        review_count: row.review_count,
        tags: json_strings(row.tags),
        operating_hours: row.operating_hours,
        phone: row.phone,
        website: row.website,
        photos: json_strings(row.photos),
        owner_id: row.owner_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Coordinates are written in the canonical `{latitude, longitude}` shape.
fn shop_to_active(shop: &Shop) -> entities::shop::ActiveModel {
    entities::shop::ActiveModel {
        id: Set(shop.id),
        name: Set(shop.name.clone()),
        description: Set(shop.description.clone()),
        category: Set(shop.category.clone()),
        address: Set(shop.address.clone()),
        coordinates: Set(shop.coordinates.to_json()),
        verified: Set(shop.verified),
        rating: Set(shop.rating),
        review_count: Set(shop.review_count),
        tags: Set(serde_json::json!(shop.tags)),
        operating_hours: Set(shop.operating_hours.clone()),
        phone: Set(shop.phone.clone()),
        website: Set(shop.website.clone()),
        photos: Set(serde_json::json!(shop.photos)),
        owner_id: Set(shop.owner_id),
        created_at: Set(shop.created_at),
        updated_at: Set(shop.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn applied() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }
    }

    #[tokio::test]
    async fn test_run_migrations_applies_every_statement() {
        let count = migration_statements(INITIAL_MIGRATION).count();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results((0..count).map(|_| applied()))
            .into_connection();

        run_migrations(&db).await.unwrap();

        let log = db.into_transaction_log();
        assert_eq!(log.len(), count);
    }

    #[tokio::test]
    async fn test_run_migrations_stops_at_first_failure() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([applied()])
            .append_exec_errors([DbErr::Custom("relation \"shops\" does not exist".to_string())])
            .into_connection();

        let err = run_migrations(&db).await.unwrap_err();
        assert!(matches!(err, DbErr::Custom(msg) if msg.contains("shops")));
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[test]
    fn test_function_bodies_survive_statement_split() {
        let statements: Vec<&str> = migration_statements(INITIAL_MIGRATION).collect();
        assert!(statements.iter().all(|s| !s.is_empty()));

        let radius = statements
            .iter()
            .find(|s| s.contains("FUNCTION get_shops_within_radius"))
            .unwrap();
        assert!(radius.trim_end().ends_with("$$"));
    }

    fn shop_row(coordinates: serde_json::Value) -> entities::shop::Model {
        entities::shop::Model {
            id: Uuid::new_v4(),
            name: "Fashion Hub".to_string(),
            description: None,
            category: "Fashion".to_string(),
            address: "789 Jalan Example, Kuala Lumpur".to_string(),
            coordinates,
            verified: true,
            rating: 5.0,
            review_count: 2,
            tags: json!(["clothing", "accessories"]),
            operating_hours: None,
            phone: None,
            website: None,
            photos: serde_json::Value::Null,
            owner_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn vote_row(review_id: Uuid, vote_type: &str) -> entities::review_vote::Model {
        entities::review_vote::Model {
            id: Uuid::new_v4(),
            review_id,
            user_id: Uuid::new_v4(),
            vote_type: vote_type.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_shop_row_accepts_legacy_coordinates() {
        for raw in [json!("3.1421,101.6867"), json!([3.1421, 101.6867]), json!({"lat": 3.1421, "lng": 101.6867})] {
            let shop = shop_from_row(shop_row(raw)).unwrap();
            assert_eq!(shop.coordinates, Coordinates::new(3.1421, 101.6867).unwrap());
            assert_eq!(shop.tags, vec!["clothing", "accessories"]);
            assert!(shop.photos.is_empty());
        }

        assert!(matches!(
            shop_from_row(shop_row(json!({"x": 1}))),
            Err(AppError::Remote(_))
        ));
    }

    #[test]
    fn test_shop_is_written_with_canonical_coordinates() {
        let shop = Shop::new(
            "Fashion Hub".into(),
            "Fashion".into(),
            "789 Jalan Example, Kuala Lumpur".into(),
            Coordinates::new(3.1421, 101.6867).unwrap(),
        )
        .with_tags(vec!["clothing".into()]);

        let active = shop_to_active(&shop);
        assert_eq!(
            active.coordinates,
            Set(json!({ "latitude": 3.1421, "longitude": 101.6867 }))
        );
        assert_eq!(active.tags, Set(json!(["clothing"])));
        assert_eq!(active.photos, Set(json!([])));
    }

    #[test]
    fn test_review_row_counts_votes_from_rows() {
        let id = Uuid::new_v4();
        let row = entities::review::Model {
            id,
            shop_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rating: 4.5,
            content: "Great food and service!".to_string(),
            photos: json!([]),
            status: "approved".to_string(),
            // stale cache is ignored
            upvotes: 7,
            downvotes: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let votes = vec![vote_row(id, "up"), vote_row(id, "up"), vote_row(id, "down")];

        let review = review_from_row(row, votes).unwrap();
        assert_eq!(review.status, ReviewStatus::Approved);
        assert_eq!((review.votes.upvotes, review.votes.downvotes), (2, 1));
        assert!(review.votes.is_consistent());
    }

    #[test]
    fn test_unknown_vote_type_is_a_store_error() {
        let id = Uuid::new_v4();
        assert!(matches!(
            aggregate(vec![vote_row(id, "sideways")]),
            Err(AppError::Remote(_))
        ));
    }
}
