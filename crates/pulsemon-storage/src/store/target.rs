use chrono::{DateTime, Duration, Utc};
use pulsemon_common::liveness;
use pulsemon_common::types::TargetRecord;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
};

use crate::credential::generate_api_key;
use crate::entities::metric_sample::{Column as SampleCol, Entity as SampleEntity};
use crate::entities::target::{self, Column as TargetCol, Entity as TargetEntity};
use crate::error::{Result, StoreError};
use crate::store::MetricStore;

/// Map a target row to its API representation, deriving `online` from
/// `last_seen` at this instant.
pub fn target_to_record(m: &target::Model, now: DateTime<Utc>, stale_after: Duration) -> TargetRecord {
    let last_seen = m.last_seen.map(|t| t.with_timezone(&Utc));
    TargetRecord {
        id: m.id.clone(),
        owner_id: m.owner_id.clone(),
        name: m.name.clone(),
        last_seen,
        online: liveness::is_online(last_seen, now, stale_after),
        source_address: m.source_address.clone(),
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl MetricStore {
    /// Register a new target for `owner_id`, minting its API key.
    ///
    /// The per-owner limit check and the insert are a single guarded
    /// `INSERT ... SELECT ... WHERE count < limit` statement, so two
    /// concurrent registrations can never both slip under the limit.
    ///
    /// Returns the created row and the plaintext API key. The key is only
    /// available here; it is stored as the lookup column and never re-issued.
    pub async fn register_target(
        &self,
        owner_id: &str,
        name: &str,
        limit: u64,
    ) -> Result<(target::Model, String)> {
        let id = pulsemon_common::id::next_id();
        let api_key = generate_api_key();
        let now = Utc::now().fixed_offset();

        let stmt = Statement::from_sql_and_values(
            self.db().get_database_backend(),
            "INSERT INTO targets (id, owner_id, name, api_key, last_seen, source_address, created_at, updated_at)
             SELECT ?, ?, ?, ?, NULL, NULL, ?, ?
             WHERE (SELECT COUNT(*) FROM targets WHERE owner_id = ?) < ?",
            [
                id.clone().into(),
                owner_id.into(),
                name.into(),
                api_key.clone().into(),
                now.into(),
                now.into(),
                owner_id.into(),
                (limit as i64).into(),
            ],
        );
        let res = self.db().execute(stmt).await?;

        if res.rows_affected() == 0 {
            let current = self.count_targets_for_owner(owner_id).await?;
            return Err(StoreError::TargetLimitExceeded { current, limit });
        }

        let model = TargetEntity::find_by_id(&id)
            .one(self.db())
            .await?
            .ok_or(StoreError::InsertReadback { entity: "target" })?;
        Ok((model, api_key))
    }

    /// Look up the target holding `api_key`. Read-only.
    ///
    /// # Errors
    ///
    /// [`StoreError::CredentialUnknown`] when no target holds the key.
    pub async fn resolve_api_key(&self, api_key: &str) -> Result<target::Model> {
        TargetEntity::find()
            .filter(TargetCol::ApiKey.eq(api_key))
            .one(self.db())
            .await?
            .ok_or(StoreError::CredentialUnknown)
    }

    pub async fn get_target(&self, id: &str) -> Result<target::Model> {
        TargetEntity::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| StoreError::TargetNotFound(id.to_owned()))
    }

    /// All targets owned by `owner_id`, oldest first.
    pub async fn list_targets(&self, owner_id: &str) -> Result<Vec<target::Model>> {
        Ok(TargetEntity::find()
            .filter(TargetCol::OwnerId.eq(owner_id))
            .order_by(TargetCol::CreatedAt, Order::Asc)
            .all(self.db())
            .await?)
    }

    pub async fn rename_target(&self, id: &str, name: &str) -> Result<target::Model> {
        let model = self.get_target(id).await?;
        let mut am: target::ActiveModel = model.into();
        am.name = Set(name.to_owned());
        am.updated_at = Set(Utc::now().fixed_offset());
        Ok(am.update(self.db()).await?)
    }

    /// Delete a target and all of its samples in one transaction.
    pub async fn remove_target(&self, id: &str) -> Result<()> {
        let txn = self.db().begin().await?;
        let model = TargetEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::TargetNotFound(id.to_owned()))?;

        SampleEntity::delete_many()
            .filter(SampleCol::TargetId.eq(id))
            .exec(&txn)
            .await?;
        model.delete(&txn).await?;
        txn.commit().await?;

        tracing::info!(target_id = %id, "target removed with its samples");
        Ok(())
    }

    pub async fn count_targets_for_owner(&self, owner_id: &str) -> Result<u64> {
        Ok(TargetEntity::find()
            .filter(TargetCol::OwnerId.eq(owner_id))
            .count(self.db())
            .await?)
    }

    pub async fn count_targets(&self) -> Result<u64> {
        Ok(TargetEntity::find().count(self.db()).await?)
    }
}
