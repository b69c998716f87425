use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{backend, violation, SeaOrmStore, Violation};
use crate::{
    document,
    entity::{session, user},
    error::{Error, Result},
    id::UserId,
    user::{NewUser, User, UserDirectory},
    username,
};

fn into_user(model: user::Model) -> Result<User> {
    Ok(User {
        id: model.id.into(),
        username: model.username,
        password_hash: model.password_hash,
        meta: document::decode(&model.meta)?,
    })
}

#[async_trait]
impl UserDirectory for SeaOrmStore {
    #[instrument(skip_all, fields(username = %user.username), err)]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let display = user.username.as_str().to_owned();
        let model = user::ActiveModel {
            id: Set(UserId::generate().into_uuid()),
            username_key: Set(user.username.key()),
            username: Set(user.username.into_inner()),
            password_hash: Set(user.password_hash),
            meta: Set(document::encode(&user.meta)?),
        };

        // The unique index on username_key is the only arbiter here, so two
        // racing registrations for "Alice" and "alice" cannot both land.
        let model = model
            .insert(&self.conn)
            .await
            .map_err(|err| match violation(&err) {
                Some(Violation::Unique(_)) => Error::DuplicateIdentity(display),
                _ => backend(err),
            })?;

        debug!(user_id = %model.id, "created user");
        into_user(model)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User> {
        let model = user::Entity::find_by_id(id.into_uuid())
            .one(&self.conn)
            .await
            .map_err(backend)?
            .ok_or(Error::NotFound)?;
        into_user(model)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User> {
        let model = user::Entity::find()
            .filter(user::Column::UsernameKey.eq(username::normalize(username)))
            .one(&self.conn)
            .await
            .map_err(backend)?
            .ok_or(Error::NotFound)?;
        into_user(model)
    }

    #[instrument(skip(self, meta), err)]
    async fn update_meta(&self, id: UserId, meta: Value) -> Result<()> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::Meta, Expr::value(document::encode(&meta)?))
            .filter(user::Column::Id.eq(id.into_uuid()))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, password_hash), err)]
    async fn update_password_hash(&self, id: UserId, password_hash: String) -> Result<()> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .filter(user::Column::Id.eq(id.into_uuid()))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_user(&self, id: UserId) -> Result<()> {
        let txn = self.conn.begin().await.map_err(backend)?;

        if user::Entity::find_by_id(id.into_uuid())
            .one(&txn)
            .await
            .map_err(backend)?
            .is_none()
        {
            return Err(Error::NotFound);
        }

        let dependents = session::Entity::find()
            .filter(session::Column::UserId.eq(id.into_uuid()))
            .count(&txn)
            .await
            .map_err(backend)?;
        if dependents > 0 {
            warn!(dependents, "refusing to delete user with sessions");
            return Err(Error::HasDependentSessions(id));
        }

        // A session inserted after the count still trips the RESTRICT key.
        user::Entity::delete_by_id(id.into_uuid())
            .exec(&txn)
            .await
            .map_err(|err| match violation(&err) {
                Some(Violation::ForeignKey) => Error::HasDependentSessions(id),
                _ => backend(err),
            })?;

        txn.commit().await.map_err(backend)?;
        debug!("deleted user");
        Ok(())
    }
}
