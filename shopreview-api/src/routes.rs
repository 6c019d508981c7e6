use crate::session::CurrentSession;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shopreview_app::domain::{
    Coordinates, ModerationDecision, NewReview, NewShop, Review, ReviewEdit, ReviewFilter,
    ReviewListing, Shop, ShopEdit, VoteResult, VoteType, DEFAULT_NEARBY_RADIUS_METERS,
};
use shopreview_app::AppContext;
use shopreview_errors::AppError;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub fn app(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/reviews", get(list_reviews).post(submit_review))
        .route(
            "/api/reviews/{id}",
            get(get_review).patch(edit_review).delete(delete_review),
        )
        .route("/api/reviews/{id}/vote", get(viewer_vote).post(vote))
        .route("/api/reviews/{id}/moderation", post(moderate))
        .route("/api/moderation/queue", get(moderation_queue))
        .route("/api/moderators/{user_id}", put(grant_moderator))
        .route("/api/shops", get(list_shops).post(create_shop))
        .route("/api/shops/nearby", get(nearby_shops))
        .route(
            "/api/shops/{id}",
            get(get_shop).patch(update_shop).delete(delete_shop),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_reviews(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Query(filter): Query<ReviewFilter>,
) -> Result<Json<Vec<ReviewListing>>, AppError> {
    let listings = ctx.reviews.list_for(session.as_ref(), &filter).await?;
    Ok(Json(listings))
}

async fn submit_review(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Json(input): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let review = ctx.reviews.submit(session.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn get_review(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>, AppError> {
    Ok(Json(ctx.reviews.get(session.as_ref(), id).await?))
}

async fn edit_review(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
    Json(edit): Json<ReviewEdit>,
) -> Result<Json<Review>, AppError> {
    Ok(Json(ctx.reviews.edit(session.as_ref(), id, edit).await?))
}

async fn delete_review(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ctx.reviews.delete(session.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct ViewerVote {
    vote: Option<VoteType>,
}

async fn viewer_vote(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<ViewerVote>, AppError> {
    let vote = ctx.reviews.viewer_vote(session.as_ref(), id).await?;
    Ok(Json(ViewerVote { vote }))
}

#[derive(Deserialize)]
struct VoteRequest {
    vote: VoteType,
}

/// Responds with the counters and the caller's own vote, never the full voter map.
async fn vote(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<VoteResult>, AppError> {
    let votes = ctx.reviews.vote(session.as_ref(), id, request.vote).await?;
    let viewer_id = session.as_ref().map(|s| s.user_id);
    Ok(Json(votes.result_for(viewer_id)))
}

#[derive(Deserialize)]
struct ModerationRequest {
    decision: ModerationDecision,
}

async fn moderate(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
    Json(request): Json<ModerationRequest>,
) -> Result<Json<Review>, AppError> {
    let review = ctx
        .reviews
        .moderate(session.as_ref(), id, request.decision)
        .await?;
    Ok(Json(review))
}

async fn moderation_queue(
    State(ctx): State<AppContext>,
    session: CurrentSession,
) -> Result<Json<Vec<ReviewListing>>, AppError> {
    Ok(Json(ctx.reviews.moderation_queue(session.as_ref()).await?))
}

#[derive(Deserialize)]
struct GrantRequest {
    email: Option<String>,
}

async fn grant_moderator(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Path(user_id): Path<Uuid>,
    Json(request): Json<GrantRequest>,
) -> Result<StatusCode, AppError> {
    ctx.reviews
        .grant_moderator(session.as_ref(), user_id, request.email)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct ShopQuery {
    category: Option<String>,
    q: Option<String>,
}

async fn list_shops(
    State(ctx): State<AppContext>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<Vec<Shop>>, AppError> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let shops = match search {
        Some(q) => {
            let mut shops = ctx.shops.search(q).await?;
            if let Some(category) = query.category.as_deref() {
                shops.retain(|s| s.category == category);
            }
            shops
        }
        None => ctx.shops.list(query.category.as_deref()).await?,
    };

    Ok(Json(shops))
}

#[derive(Deserialize)]
struct NearbyQuery {
    lat: f64,
    lng: f64,
    radius_meters: Option<f64>,
}

async fn nearby_shops(
    State(ctx): State<AppContext>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<Shop>>, AppError> {
    let center = Coordinates::new(query.lat, query.lng)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let radius = query.radius_meters.unwrap_or(DEFAULT_NEARBY_RADIUS_METERS);
    if !radius.is_finite() || radius <= 0.0 {
        return Err(AppError::Validation(
            "radius_meters must be a positive number".to_string(),
        ));
    }

    Ok(Json(ctx.shops.nearby(center, radius).await?))
}

async fn get_shop(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shop>, AppError> {
    Ok(Json(ctx.shops.get(id).await?))
}

async fn create_shop(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Json(input): Json<NewShop>,
) -> Result<(StatusCode, Json<Shop>), AppError> {
    let shop = ctx.shops.create(session.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(shop)))
}

async fn update_shop(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
    Json(edit): Json<ShopEdit>,
) -> Result<Json<Shop>, AppError> {
    Ok(Json(ctx.shops.update(session.as_ref(), id, edit).await?))
}

async fn delete_shop(
    State(ctx): State<AppContext>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ctx.shops.delete(session.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
