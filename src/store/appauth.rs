use async_trait::async_trait;
use sea_orm::{sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use super::{
    backend, convert_datetime_to_time, convert_time_to_datetime, violation, SeaOrmStore,
    Violation,
};
use crate::{
    appauth::{AppAuth, NewAppAuth, TokenRegistry},
    document,
    entity::appauth::{self, TOKEN_INDEX},
    error::{Error, Result},
    id::AppAuthId,
};

fn into_app_auth(model: appauth::Model) -> Result<AppAuth> {
    Ok(AppAuth {
        id: model.id.into(),
        name: model.name,
        description: model.description,
        token: model.token,
        meta: document::decode(&model.meta)?,
        expires_at: model.expires_at.map(convert_datetime_to_time).transpose()?,
    })
}

/// Whether a unique violation came from the token index rather than the name
/// index. PostgreSQL reports the index name, SQLite the `table.column` pair.
fn is_token_conflict(detail: &str) -> bool {
    detail.contains(TOKEN_INDEX) || detail.contains("appauth.token")
}

/// Compares two byte strings without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

impl SeaOrmStore {
    async fn find_app_auth(&self, id: AppAuthId) -> Result<AppAuth> {
        let model = appauth::Entity::find_by_id(id.into_uuid())
            .one(&self.conn)
            .await
            .map_err(backend)?
            .ok_or(Error::NotFound)?;
        into_app_auth(model)
    }
}

#[async_trait]
impl TokenRegistry for SeaOrmStore {
    #[instrument(skip_all, fields(name = %app.name), err)]
    async fn issue_token(&self, app: NewAppAuth) -> Result<AppAuth> {
        let name = app.name.clone();
        let model = appauth::ActiveModel {
            id: Set(AppAuthId::generate().into_uuid()),
            name: Set(app.name),
            description: Set(app.description),
            token: Set(app.token),
            meta: Set(document::encode(&app.meta)?),
            expires_at: Set(app.expires_at.map(convert_time_to_datetime).transpose()?),
        };

        let model = model
            .insert(&self.conn)
            .await
            .map_err(|err| match violation(&err) {
                Some(Violation::Unique(detail)) if is_token_conflict(&detail) => {
                    Error::DuplicateToken
                }
                Some(Violation::Unique(_)) => Error::DuplicateName(name),
                _ => backend(err),
            })?;

        debug!(app_id = %model.id, "issued service token");
        into_app_auth(model)
    }

    async fn get_app_auth(&self, id: AppAuthId) -> Result<AppAuth> {
        self.find_app_auth(id).await
    }

    #[instrument(skip_all, err(level = "debug"))]
    async fn resolve_by_token(&self, token: &str) -> Result<AppAuth> {
        let model = appauth::Entity::find()
            .filter(appauth::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .map_err(backend)?
            .ok_or(Error::NotFound)?;
        let app = into_app_auth(model)?;

        if !app.is_live(OffsetDateTime::now_utc()) {
            warn!(app_id = %app.id, name = %app.name, "rejected expired service token");
            return Err(Error::Expired);
        }
        Ok(app)
    }

    #[instrument(skip(self, token), err(level = "debug"))]
    async fn verify_token(&self, id: AppAuthId, token: &str) -> Result<()> {
        let app = self.find_app_auth(id).await?;

        if !constant_time_eq(app.token.as_bytes(), token.as_bytes()) {
            return Err(Error::InvalidToken);
        }
        if !app.is_live(OffsetDateTime::now_utc()) {
            return Err(Error::Expired);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn revoke(&self, id: AppAuthId) -> Result<()> {
        let result = appauth::Entity::delete_by_id(id.into_uuid())
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }
        info!("revoked service token");
        Ok(())
    }

    #[instrument(skip(self, token), err)]
    async fn rotate_token(&self, id: AppAuthId, token: String) -> Result<()> {
        let result = appauth::Entity::update_many()
            .col_expr(appauth::Column::Token, Expr::value(token))
            .filter(appauth::Column::Id.eq(id.into_uuid()))
            .exec(&self.conn)
            .await
            .map_err(|err| match violation(&err) {
                Some(Violation::Unique(_)) => Error::DuplicateToken,
                _ => backend(err),
            })?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }
        info!("rotated service token");
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn set_token_expiry(
        &self,
        id: AppAuthId,
        expires_at: Option<OffsetDateTime>,
    ) -> Result<()> {
        let expires_at = expires_at.map(convert_time_to_datetime).transpose()?;
        let result = appauth::Entity::update_many()
            .col_expr(appauth::Column::ExpiresAt, Expr::value(expires_at))
            .filter(appauth::Column::Id.eq(id.into_uuid()))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_expired_tokens(&self, now: OffsetDateTime) -> Result<u64> {
        let result = appauth::Entity::delete_many()
            .filter(appauth::Column::ExpiresAt.lte(convert_time_to_datetime(now)?))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        info!(reaped = result.rows_affected, "deleted expired service tokens");
        Ok(result.rows_affected)
    }
}
