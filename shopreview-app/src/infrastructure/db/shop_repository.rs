use super::entities::{shop, Shop as ShopRow};
use super::{remote, shop_from_row, shop_to_active};
use crate::application::ShopCatalog;
use crate::domain::{Coordinates, Shop};
use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    entity::*, query::*, ActiveValue, DatabaseBackend, DatabaseConnection, DbErr, Statement,
};
use shopreview_errors::AppError;
use uuid::Uuid;

#[derive(Clone)]
pub struct ShopRepository {
    db: DatabaseConnection,
}

impl ShopRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("shop {id}"))
}

/// `%query%` for ILIKE with the wildcard characters in `query` matched literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn into_shops(rows: Vec<shop::Model>) -> Result<Vec<Shop>, AppError> {
    rows.into_iter().map(shop_from_row).collect()
}

#[async_trait]
impl ShopCatalog for ShopRepository {
    async fn list(&self, category: Option<&str>) -> Result<Vec<Shop>, AppError> {
        let mut query = ShopRow::find();
        if let Some(category) = category {
            query = query.filter(shop::Column::Category.eq(category));
        }

        let rows = query
            .order_by_asc(shop::Column::Name)
            .all(&self.db)
            .await
            .map_err(remote)?;
        into_shops(rows)
    }

    async fn search(&self, query: &str) -> Result<Vec<Shop>, AppError> {
        let pattern = like_pattern(query);
        let rows = ShopRow::find()
            .filter(
                Condition::any()
                    .add(Expr::col(shop::Column::Name).ilike(pattern.as_str()))
                    .add(Expr::col(shop::Column::Description).ilike(pattern.as_str())),
            )
            .order_by_asc(shop::Column::Name)
            .all(&self.db)
            .await
            .map_err(remote)?;
        into_shops(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Shop>, AppError> {
        ShopRow::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(remote)?
            .map(shop_from_row)
            .transpose()
    }

    async fn nearby(&self, center: Coordinates, radius_meters: f64) -> Result<Vec<Shop>, AppError> {
        let rows = ShopRow::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT * FROM get_shops_within_radius($1, $2, $3)",
                [
                    center.latitude.into(),
                    center.longitude.into(),
                    radius_meters.into(),
                ],
            ))
            .all(&self.db)
            .await
            .map_err(remote)?;
        into_shops(rows)
    }

    async fn insert_shop(&self, shop: Shop) -> Result<Shop, AppError> {
        ShopRow::insert(shop_to_active(&shop))
            .exec_without_returning(&self.db)
            .await
            .map_err(remote)?;
        Ok(shop)
    }

    async fn update_shop(&self, shop: Shop) -> Result<Shop, AppError> {
        // rating and review_count belong to the review triggers
        let mut active = shop_to_active(&shop);
        active.rating = ActiveValue::NotSet;
        active.review_count = ActiveValue::NotSet;
        active.created_at = ActiveValue::NotSet;

        let row = active.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => not_found(shop.id),
            other => remote(other),
        })?;
        shop_from_row(row)
    }

    async fn delete_shop(&self, id: Uuid) -> Result<(), AppError> {
        let result = ShopRow::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(remote)?;
        if result.rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn shop() -> Shop {
        Shop::new(
            "Tech Zone".into(),
            "Electronics".into(),
            "123 Jalan Example, Kuala Lumpur".into(),
            Coordinates::new(3.1380, 101.6871).unwrap(),
        )
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" laksa "), "%laksa%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\d"), "%c:\\\\d%");
    }

    #[tokio::test]
    async fn test_insert_shop_writes_one_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();
        let repo = ShopRepository::new(db);

        let shop = shop();
        assert_eq!(repo.insert_shop(shop.clone()).await.unwrap(), shop);
    }

    #[tokio::test]
    async fn test_update_of_missing_shop_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<shop::Model>::new()])
            .into_connection();
        let repo = ShopRepository::new(db);

        assert!(matches!(repo.update_shop(shop()).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_shop_reports_missing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let repo = ShopRepository::new(db);
        let id = Uuid::new_v4();

        assert!(repo.delete_shop(id).await.is_ok());
        assert!(matches!(repo.delete_shop(id).await, Err(AppError::NotFound(_))));
    }
}
