use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use thiserror::Error;

use crate::entities::{detection_record, favorite_record, DetectionRecord, FavoriteRecord};

#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error("detection record does not exist")]
    NotFound,

    #[error("already favorited")]
    Conflict,

    #[error(transparent)]
    Database(#[from] DbErr),
}

/// User bookmarks on detection records, unique per (user, detection).
#[derive(Clone)]
pub struct FavoriteManager {
    db: DatabaseConnection,
}

impl FavoriteManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Snapshot a detection record into a new favorite.
    ///
    /// Fails with [`FavoriteError::NotFound`] when the detection is gone and
    /// [`FavoriteError::Conflict`] when this user already saved it.
    pub async fn add(
        &self,
        user_id: i32,
        detection_id: i32,
    ) -> Result<favorite_record::Model, FavoriteError> {
        let result = self.try_add(user_id, detection_id).await;
        let outcome = match &result {
            Ok(_) => Some("created"),
            Err(FavoriteError::NotFound) => Some("not_found"),
            Err(FavoriteError::Conflict) => Some("conflict"),
            Err(FavoriteError::Database(_)) => None,
        };
        if let Some(outcome) = outcome {
            metrics::counter!("beanscan_favorites_total", "outcome" => outcome).increment(1);
        }
        result
    }

    async fn try_add(
        &self,
        user_id: i32,
        detection_id: i32,
    ) -> Result<favorite_record::Model, FavoriteError> {
        let detection = DetectionRecord::find_by_id(detection_id)
            .one(&self.db)
            .await?
            .ok_or(FavoriteError::NotFound)?;

        let existing = FavoriteRecord::find()
            .filter(favorite_record::Column::UserId.eq(user_id))
            .filter(favorite_record::Column::DetectionId.eq(detection_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(FavoriteError::Conflict);
        }

        self.insert_snapshot(user_id, detection).await
    }

    /// Insert the favorite row copying the detection's display fields. A
    /// concurrent add can slip past the checks in `try_add`; the unique index
    /// and the FK catch it here.
    async fn insert_snapshot(
        &self,
        user_id: i32,
        detection: detection_record::Model,
    ) -> Result<favorite_record::Model, FavoriteError> {
        let favorite = favorite_record::ActiveModel {
            user_id: Set(user_id),
            detection_id: Set(detection.id),
            defects_name: Set(detection.defects_name),
            image_path: Set(detection.image_path),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        match favorite.insert(&self.db).await {
            Ok(favorite) => {
                tracing::info!(
                    favorite_id = favorite.id,
                    user_id = user_id,
                    detection_id = favorite.detection_id,
                    "Favorite created"
                );
                Ok(favorite)
            }
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(FavoriteError::Conflict),
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => Err(FavoriteError::NotFound),
                _ => Err(FavoriteError::Database(e)),
            },
        }
    }

    /// Returns `false` when no favorite had this id.
    pub async fn delete(&self, favorite_id: i32) -> Result<bool, DbErr> {
        let res = FavoriteRecord::delete_by_id(favorite_id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    /// Like [`delete`](Self::delete), but only removes the favorite if `user_id` owns it.
    pub async fn delete_owned(&self, user_id: i32, favorite_id: i32) -> Result<bool, DbErr> {
        let res = FavoriteRecord::delete_many()
            .filter(favorite_record::Column::Id.eq(favorite_id))
            .filter(favorite_record::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<favorite_record::Model>, DbErr> {
        FavoriteRecord::find()
            .filter(favorite_record::Column::UserId.eq(user_id))
            .order_by_desc(favorite_record::Column::CreatedAt)
            .order_by_desc(favorite_record::Column::Id)
            .all(&self.db)
            .await
    }

    /// Case-insensitive substring match on the stored defect names, newest first.
    pub async fn search(
        &self,
        user_id: i32,
        keyword: &str,
    ) -> Result<Vec<favorite_record::Model>, DbErr> {
        let pattern = format!("%{}%", escape_like(&keyword.to_lowercase()));

        FavoriteRecord::find()
            .filter(favorite_record::Column::UserId.eq(user_id))
            .filter(
                Expr::expr(Func::lower(Expr::col(favorite_record::Column::DefectsName)))
                    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            )
            .order_by_desc(favorite_record::Column::CreatedAt)
            .order_by_desc(favorite_record::Column::Id)
            .all(&self.db)
            .await
    }
}

const LIKE_ESCAPE: char = '!';

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, LIKE_ESCAPE | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
