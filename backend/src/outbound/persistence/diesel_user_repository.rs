//! PostgreSQL-backed `UserRepository`.
//!
//! Users and their role links are written in one transaction. Lookups by
//! email and user name compare the upper-cased `normalized_*` columns.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    ConcurrencyStamp, Email, FirstName, LastName, PasswordHash, Role, User, UserId, UserName,
    UserParts, UserProfile,
};

use super::diesel_error_mapping::{DbFailure, USERS_EMAIL_KEY, USERS_USER_NAME_KEY};
use super::models::{NewUserRoleRow, NewUserRow, UserProfileUpdate, UserRow};
use super::pool::DbPool;
use super::schema::{roles, user_roles, users};

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_roles(
        conn: &mut diesel_async::AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Vec<String>, DieselError> {
        user_roles::table
            .inner_join(roles::table)
            .filter(user_roles::user_id.eq(user_id))
            .select(roles::name)
            .load::<String>(conn)
            .await
    }

    async fn hydrate(
        conn: &mut diesel_async::AsyncPgConnection,
        row: Option<UserRow>,
    ) -> Result<Option<User>, UserRepositoryError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let role_names = Self::load_roles(conn, row.id)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(row, &role_names).map(Some)
    }
}

fn map_failure(failure: DbFailure) -> UserRepositoryError {
    if failure.violates(USERS_USER_NAME_KEY) {
        return UserRepositoryError::duplicate_user_name();
    }
    if failure.violates(USERS_EMAIL_KEY) {
        return UserRepositoryError::duplicate_email();
    }
    match failure {
        DbFailure::Connection(message) => UserRepositoryError::connection(message),
        DbFailure::Query(message) => UserRepositoryError::query(message),
        DbFailure::Unique(_) | DbFailure::ForeignKey(_) => {
            UserRepositoryError::query("constraint violation")
        }
    }
}

fn map_diesel_error(error: DieselError) -> UserRepositoryError {
    map_failure(DbFailure::from(error))
}

fn corrupt(field: &str, error: impl std::fmt::Display) -> UserRepositoryError {
    UserRepositoryError::query(format!("stored user has invalid {field}: {error}"))
}

fn row_to_user(row: UserRow, role_names: &[String]) -> Result<User, UserRepositoryError> {
    let email = Email::new(row.email).map_err(|err| corrupt("email", err))?;
    let profile = UserProfile {
        first_name: FirstName::new(row.first_name).map_err(|err| corrupt("first name", err))?,
        last_name: LastName::new(row.last_name).map_err(|err| corrupt("last name", err))?,
        user_name: UserName::new(row.user_name).map_err(|err| corrupt("user name", err))?,
    };
    let roles = role_names
        .iter()
        .map(|name| name.parse::<Role>().map_err(|err| corrupt("role", err)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(User::from_parts(UserParts {
        id: UserId::from_uuid(row.id),
        email,
        profile,
        password_hash: PasswordHash::new(row.password_hash),
        concurrency_stamp: ConcurrencyStamp::from_uuid(row.concurrency_stamp),
        avatar_url: row.avatar_url,
        roles,
        created_at: row.created_at,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;

        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            normalized_email: user.email().normalized(),
            user_name: user.user_name().as_ref(),
            normalized_user_name: user.user_name().normalized(),
            first_name: user.first_name().as_ref(),
            last_name: user.last_name().as_ref(),
            password_hash: user.password_hash().as_str(),
            concurrency_stamp: *user.concurrency_stamp().as_uuid(),
            avatar_url: user.avatar_url(),
            created_at: user.created_at(),
        };
        let role_names: Vec<&str> = user.roles().iter().map(|role| role.as_str()).collect();
        let user_id = row.id;

        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&row)
                    .execute(conn)
                    .await?;

                let role_ids: Vec<Uuid> = roles::table
                    .filter(roles::name.eq_any(&role_names))
                    .select(roles::id)
                    .load(conn)
                    .await?;
                if role_ids.len() != role_names.len() {
                    return Err(DieselError::NotFound);
                }

                let links: Vec<NewUserRoleRow> = role_ids
                    .into_iter()
                    .map(|role_id| NewUserRoleRow { user_id, role_id })
                    .collect();
                diesel::insert_into(user_roles::table)
                    .values(&links)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Self::hydrate(&mut conn, row).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let row = users::table
            .filter(users::normalized_email.eq(email.normalized()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Self::hydrate(&mut conn, row).await
    }

    async fn user_name_exists(&self, user_name: &UserName) -> Result<bool, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::normalized_user_name.eq(user_name.normalized())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn update_profile(
        &self,
        user: &User,
        expected: ConcurrencyStamp,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let changes = UserProfileUpdate {
            first_name: user.first_name().as_ref(),
            last_name: user.last_name().as_ref(),
            user_name: user.user_name().as_ref(),
            normalized_user_name: user.user_name().normalized(),
            concurrency_stamp: *user.concurrency_stamp().as_uuid(),
        };

        let updated = diesel::update(
            users::table
                .filter(users::id.eq(user.id().as_uuid()))
                .filter(users::concurrency_stamp.eq(expected.as_uuid())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let exists: bool = diesel::select(diesel::dsl::exists(
            users::table.filter(users::id.eq(user.id().as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if exists {
            Err(UserRepositoryError::concurrency_conflict())
        } else {
            Err(UserRepositoryError::not_found())
        }
    }

    async fn set_avatar_url(&self, id: &UserId, url: &str) -> Result<(), UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::avatar_url.eq(url))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(UserRepositoryError::not_found());
        }
        Ok(())
    }
}
