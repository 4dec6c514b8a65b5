//! Authorization guards that enforce permission checks at the type level.
//! Handlers that need a membership or an admin must go through a guard, so
//! a missing check shows up as a missing argument rather than a silent hole.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::SessionIdentity;

/// The authenticated caller, extracted from request extensions (set by the
/// auth middleware).
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<SessionIdentity>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        Ok(User {
            id: identity.id,
            email: identity.email,
            display_name: identity.display_name,
        })
    }
}

/// A verified union membership with the permission context handlers need.
#[derive(Debug, Clone)]
pub struct UnionMember {
    pub user_id: Uuid,
    pub union_id: Uuid,
    pub role: String,
    pub banned: bool,
    pub can_post: bool,
    pub can_moderate: bool,
}

impl UnionMember {
    /// Verify membership with one query covering role and ban state.
    pub async fn verify(db: &PgPool, user_id: Uuid, union_id: Uuid) -> Result<Self, AppError> {
        let member = sqlx::query_as::<_, UnionMemberRecord>(
            r#"
            SELECT
                um.user_id,
                um.union_id,
                um.role,
                u.banned,
                (um.role = 'admin') AS is_admin
            FROM union_members um
            JOIN users u ON u.id = um.user_id
            WHERE um.user_id = $1 AND um.union_id = $2
            "#,
        )
        .bind(user_id)
        .bind(union_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::Forbidden)?;

        Ok(UnionMember {
            user_id: member.user_id,
            union_id: member.union_id,
            role: member.role,
            banned: member.banned,
            can_post: !member.banned,
            can_moderate: member.is_admin,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn ensure_can_post(&self) -> Result<(), AppError> {
        if self.banned || !self.can_post {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    pub fn ensure_can_moderate(&self) -> Result<(), AppError> {
        if !self.can_moderate {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct UnionMemberRecord {
    user_id: Uuid,
    union_id: Uuid,
    role: String,
    banned: bool,
    is_admin: bool,
}

/// A union admin: strictly stronger than `UnionMember`.
#[derive(Debug, Clone)]
pub struct UnionAdmin {
    pub inner: UnionMember,
}

impl UnionAdmin {
    pub async fn verify(db: &PgPool, user_id: Uuid, union_id: Uuid) -> Result<Self, AppError> {
        let member = UnionMember::verify(db, user_id, union_id).await?;

        if !member.is_admin() {
            return Err(AppError::Forbidden);
        }

        Ok(UnionAdmin { inner: member })
    }
}

/// A verified participant of a chat group: union membership plus the
/// group-type rules (private needs a group_members row, announcement groups
/// take posts from union admins only).
#[derive(Debug, Clone)]
pub struct GroupMember {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub union_id: Uuid,
    pub group_type: String,
    pub union_role: String,
    pub banned: bool,
    pub in_group: bool,
}

impl GroupMember {
    pub async fn verify(db: &PgPool, user_id: Uuid, group_id: Uuid) -> Result<Self, AppError> {
        let gate = sqlx::query_as::<_, GroupGateRecord>(
            r#"
            SELECT
                g.id AS group_id,
                g.union_id,
                g.group_type,
                um.role AS union_role,
                u.banned,
                EXISTS(
                    SELECT 1 FROM group_members gm
                    WHERE gm.group_id = g.id AND gm.user_id = $1
                ) AS in_group
            FROM groups g
            JOIN union_members um ON um.union_id = g.union_id AND um.user_id = $1
            JOIN users u ON u.id = $1
            WHERE g.id = $2
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_optional(db)
        .await?;

        let gate = match gate {
            Some(gate) => gate,
            None => {
                // Distinguish a missing group from a missing membership.
                let exists: Option<i32> =
                    sqlx::query_scalar("SELECT 1 FROM groups WHERE id = $1")
                        .bind(group_id)
                        .fetch_optional(db)
                        .await?;
                return Err(if exists.is_some() {
                    AppError::Forbidden
                } else {
                    AppError::NotFound
                });
            }
        };

        Ok(GroupMember {
            user_id,
            group_id: gate.group_id,
            union_id: gate.union_id,
            group_type: gate.group_type,
            union_role: gate.union_role,
            banned: gate.banned,
            in_group: gate.in_group,
        })
    }

    pub fn can_read(&self) -> bool {
        self.group_type != "private" || self.in_group
    }

    pub fn ensure_can_read(&self) -> Result<(), AppError> {
        if !self.can_read() {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    pub fn ensure_can_post(&self) -> Result<(), AppError> {
        if self.banned {
            return Err(AppError::Forbidden);
        }
        match self.group_type.as_str() {
            "announcement" if self.union_role != "admin" => Err(AppError::Forbidden),
            "private" if !self.in_group => Err(AppError::Forbidden),
            _ => Ok(()),
        }
    }
}

#[derive(sqlx::FromRow)]
struct GroupGateRecord {
    group_id: Uuid,
    union_id: Uuid,
    group_type: String,
    union_role: String,
    banned: bool,
    in_group: bool,
}

/// Site-wide administrator (users.role = 'admin'), for the user-management
/// surface that crosses union boundaries.
#[derive(Debug, Clone)]
pub struct SiteAdmin {
    pub user_id: Uuid,
}

impl SiteAdmin {
    pub async fn verify(db: &PgPool, user_id: Uuid) -> Result<Self, AppError> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?;

        match role.as_deref() {
            Some("admin") => Ok(SiteAdmin { user_id }),
            Some(_) => Err(AppError::Forbidden),
            None => Err(AppError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_with(role: &str, banned: bool) -> UnionMember {
        UnionMember {
            user_id: Uuid::new_v4(),
            union_id: Uuid::new_v4(),
            role: role.to_string(),
            banned,
            can_post: !banned,
            can_moderate: role == "admin",
        }
    }

    #[test]
    fn member_can_post_when_not_banned() {
        assert!(member_with("member", false).ensure_can_post().is_ok());
    }

    #[test]
    fn banned_member_cannot_post() {
        assert!(member_with("member", true).ensure_can_post().is_err());
    }

    #[test]
    fn only_admins_moderate() {
        assert!(member_with("member", false).ensure_can_moderate().is_err());
        assert!(member_with("admin", false).ensure_can_moderate().is_ok());
    }

    fn group_member(group_type: &str, union_role: &str, in_group: bool) -> GroupMember {
        GroupMember {
            user_id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            union_id: Uuid::new_v4(),
            group_type: group_type.to_string(),
            union_role: union_role.to_string(),
            banned: false,
            in_group,
        }
    }

    #[test]
    fn announcement_groups_take_admin_posts_only() {
        assert!(group_member("announcement", "member", false)
            .ensure_can_post()
            .is_err());
        assert!(group_member("announcement", "admin", false)
            .ensure_can_post()
            .is_ok());
    }

    #[test]
    fn private_groups_require_group_membership() {
        let outsider = group_member("private", "member", false);
        assert!(!outsider.can_read());
        assert!(outsider.ensure_can_post().is_err());

        let insider = group_member("private", "member", true);
        assert!(insider.can_read());
        assert!(insider.ensure_can_post().is_ok());
    }

    #[test]
    fn public_groups_are_open_to_union_members() {
        let member = group_member("public", "member", false);
        assert!(member.can_read());
        assert!(member.ensure_can_post().is_ok());
    }
}
