use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::union::{UnionRecord, UnionSummary};

pub struct UnionService;

impl UnionService {
    /// Create a union with its creator installed as an admin member, in one
    /// transaction so the invariant can never be observed broken.
    pub async fn create_with_admin(
        db: &Pool<Postgres>,
        name: &str,
        invite_code: &str,
        created_by: Uuid,
    ) -> Result<UnionRecord, AppError> {
        let id = Uuid::new_v4();
        let mut tx = db.begin().await?;

        let union = sqlx::query_as::<_, UnionRecord>(
            "INSERT INTO unions (id, name, invite_code, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, invite_code, created_by, created_at",
        )
        .bind(id)
        .bind(name)
        .bind(invite_code)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("unions_invite_code_key") =>
            {
                AppError::Conflict("invite code already in use".into())
            }
            _ => AppError::Database(e),
        })?;

        sqlx::query(
            "INSERT INTO union_members (union_id, user_id, role) VALUES ($1, $2, 'admin')",
        )
        .bind(id)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(union)
    }

    /// The unions whose member set contains this user, in query order. This
    /// is the server half of the client's membership resolver.
    pub async fn unions_for_user(
        db: &Pool<Postgres>,
        user_id: Uuid,
    ) -> Result<Vec<UnionSummary>, AppError> {
        let rows = sqlx::query_as::<_, UnionSummary>(
            "SELECT u.id, u.name \
             FROM unions u \
             JOIN union_members um ON um.union_id = u.id \
             WHERE um.user_id = $1 \
             ORDER BY u.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn is_member(
        db: &Pool<Postgres>,
        union_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM union_members WHERE union_id = $1 AND user_id = $2",
        )
        .bind(union_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(exists.is_some())
    }

    /// Join by invite code. The membership insert is an add-to-set: joining
    /// twice is a no-op, and concurrent joins cannot lose rows.
    pub async fn join_by_code(
        db: &Pool<Postgres>,
        invite_code: &str,
        user_id: Uuid,
    ) -> Result<UnionRecord, AppError> {
        let union = sqlx::query_as::<_, UnionRecord>(
            "SELECT id, name, invite_code, created_by, created_at \
             FROM unions WHERE invite_code = $1",
        )
        .bind(invite_code)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)?;

        let banned: bool = sqlx::query_scalar("SELECT banned FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .unwrap_or(false);
        if banned {
            return Err(AppError::Forbidden);
        }

        sqlx::query(
            "INSERT INTO union_members (union_id, user_id, role) VALUES ($1, $2, 'member') \
             ON CONFLICT (union_id, user_id) DO NOTHING",
        )
        .bind(union.id)
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(union)
    }

    pub async fn leave(
        db: &Pool<Postgres>,
        union_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM union_members WHERE union_id = $1 AND user_id = $2")
            .bind(union_id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }
}
