use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, instrument};

use super::{
    backend, convert_datetime_to_time, convert_time_to_datetime, violation, SeaOrmStore,
    Violation,
};
use crate::{
    document,
    entity::{session, user},
    error::{Error, Result},
    id::{SessionId, UserId},
    session::{expires_after, Session, SessionLedger},
};

fn into_session(model: session::Model) -> Result<Session> {
    Ok(Session {
        id: model.id.into(),
        user_id: model.user_id.into(),
        data: document::decode(&model.data)?,
        expires_at: convert_datetime_to_time(model.expires_at)?,
    })
}

#[async_trait]
impl SessionLedger for SeaOrmStore {
    #[instrument(skip(self, data), err)]
    async fn create_session(
        &self,
        user_id: UserId,
        data: Option<Value>,
        ttl: Duration,
    ) -> Result<Session> {
        let expires_at =
            convert_time_to_datetime(expires_after(OffsetDateTime::now_utc(), ttl)?)?;
        let data = document::encode(&data.unwrap_or_else(document::empty))?;

        let txn = self.conn.begin().await.map_err(backend)?;

        if user::Entity::find_by_id(user_id.into_uuid())
            .one(&txn)
            .await
            .map_err(backend)?
            .is_none()
        {
            return Err(Error::UnknownUser(user_id));
        }

        let session_model = session::ActiveModel {
            id: Set(SessionId::generate().into_uuid()),
            user_id: Set(user_id.into_uuid()),
            data: Set(data),
            expires_at: Set(expires_at),
        };

        let model = session_model
            .insert(&txn)
            .await
            .map_err(|err| match violation(&err) {
                Some(Violation::ForeignKey) => Error::UnknownUser(user_id),
                _ => backend(err),
            })?;

        txn.commit().await.map_err(backend)?;

        debug!(session_id = %model.id, "opened session");
        into_session(model)
    }

    async fn get_session(&self, id: SessionId) -> Result<Session> {
        let model = session::Entity::find_by_id(id.into_uuid())
            .one(&self.conn)
            .await
            .map_err(backend)?
            .ok_or(Error::NotFound)?;
        into_session(model)
    }

    #[instrument(skip(self), err)]
    async fn touch(&self, id: SessionId, expires_at: OffsetDateTime) -> Result<()> {
        let result = session::Entity::update_many()
            .col_expr(
                session::Column::ExpiresAt,
                Expr::value(convert_time_to_datetime(expires_at)?),
            )
            .filter(session::Column::Id.eq(id.into_uuid()))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, data), err)]
    async fn update_data(&self, id: SessionId, data: Value) -> Result<()> {
        let result = session::Entity::update_many()
            .col_expr(session::Column::Data, Expr::value(document::encode(&data)?))
            .filter(session::Column::Id.eq(id.into_uuid()))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_session(&self, id: SessionId) -> Result<()> {
        let result = session::Entity::delete_by_id(id.into_uuid())
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_user_sessions(&self, user_id: UserId) -> Result<u64> {
        let result = session::Entity::delete_many()
            .filter(session::Column::UserId.eq(user_id.into_uuid()))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        debug!(removed = result.rows_affected, "closed user sessions");
        Ok(result.rows_affected)
    }

    #[instrument(skip(self), err)]
    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64> {
        let result = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(convert_time_to_datetime(now)?))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        info!(reaped = result.rows_affected, "deleted expired sessions");
        Ok(result.rows_affected)
    }
}
