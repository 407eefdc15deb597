use chrono::{DateTime, Utc};
use pulsemon_common::types::{SamplePayload, SampleRecord};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};

use crate::entities::metric_sample::{self, Column as SampleCol, Entity as SampleEntity};
use crate::entities::target::{self, Entity as TargetEntity};
use crate::error::{Result, StoreError};
use crate::store::MetricStore;
use crate::SampleWindow;

fn sample_to_record(m: &metric_sample::Model) -> SampleRecord {
    SampleRecord {
        id: m.id.clone(),
        target_id: m.target_id.clone(),
        cpu_usage: m.cpu_usage_percent,
        memory_usage: m.memory_usage_percent,
        memory_total: m.memory_total_bytes,
        memory_used: m.memory_used_bytes,
        timestamp: DateTime::from_timestamp_millis(m.timestamp).unwrap_or_default(),
    }
}

impl MetricStore {
    /// Append one validated sample and refresh the target's liveness state,
    /// atomically.
    ///
    /// The insert and the `last_seen` update share one transaction: a reader
    /// can never observe the new sample next to stale target state, and a
    /// failure rolls back both sides. `last_seen` is last-write-wins by the
    /// sample's effective timestamp, so a backfilled old sample is stored
    /// but does not move liveness backward.
    ///
    /// The sample timestamp defaults to the ingestion clock when the agent
    /// omitted it. Duplicate timestamps are allowed; samples are facts, not
    /// commands.
    pub async fn ingest_sample(
        &self,
        target_id: &str,
        payload: &SamplePayload,
        source_address: Option<&str>,
    ) -> Result<SampleRecord> {
        let effective_ts = payload.timestamp.unwrap_or_else(Utc::now);

        let txn = self.db().begin().await?;

        let target = TargetEntity::find_by_id(target_id)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::TargetNotFound(target_id.to_owned()))?;

        let row = metric_sample::ActiveModel {
            id: Set(pulsemon_common::id::next_id()),
            target_id: Set(target_id.to_owned()),
            cpu_usage_percent: Set(payload.cpu_usage),
            memory_usage_percent: Set(payload.memory_usage),
            memory_total_bytes: Set(payload.memory_total),
            memory_used_bytes: Set(payload.memory_used),
            timestamp: Set(effective_ts.timestamp_millis()),
        };
        let inserted = row.insert(&txn).await?;

        let moves_forward = target
            .last_seen
            .map_or(true, |seen| effective_ts >= seen.with_timezone(&Utc));
        let mut am: target::ActiveModel = target.into();
        if moves_forward {
            am.last_seen = Set(Some(effective_ts.fixed_offset()));
            if let Some(addr) = source_address {
                am.source_address = Set(Some(addr.to_owned()));
            }
        }
        am.updated_at = Set(Utc::now().fixed_offset());
        am.update(&txn).await?;

        txn.commit().await?;
        Ok(sample_to_record(&inserted))
    }

    /// Samples for a target within an inclusive window, newest first.
    ///
    /// Re-querying re-executes; there is no cursor. An unknown target, an
    /// empty window or an inverted one (`from > to`) all yield an empty
    /// vector, never an error.
    pub async fn query_samples(
        &self,
        target_id: &str,
        window: &SampleWindow,
    ) -> Result<Vec<SampleRecord>> {
        let mut q = SampleEntity::find().filter(SampleCol::TargetId.eq(target_id));
        if let Some(from) = window.from {
            q = q.filter(SampleCol::Timestamp.gte(from.timestamp_millis()));
        }
        if let Some(to) = window.to {
            q = q.filter(SampleCol::Timestamp.lte(to.timestamp_millis()));
        }
        let rows = q
            .order_by(SampleCol::Timestamp, Order::Desc)
            .order_by(SampleCol::Id, Order::Desc)
            .all(self.db())
            .await?;
        Ok(rows.iter().map(sample_to_record).collect())
    }

    /// The single most recent sample, or `None` when the target has never
    /// reported. Absence is explicit; it is never encoded as a zero sample.
    pub async fn latest_sample(&self, target_id: &str) -> Result<Option<SampleRecord>> {
        let row = SampleEntity::find()
            .filter(SampleCol::TargetId.eq(target_id))
            .order_by(SampleCol::Timestamp, Order::Desc)
            .order_by(SampleCol::Id, Order::Desc)
            .one(self.db())
            .await?;
        Ok(row.as_ref().map(sample_to_record))
    }

    pub async fn count_samples(&self, target_id: &str) -> Result<u64> {
        Ok(SampleEntity::find()
            .filter(SampleCol::TargetId.eq(target_id))
            .count(self.db())
            .await?)
    }

    /// Irreversibly delete all samples older than `cutoff`, any target.
    /// Maintenance operation; runs off the request hot path.
    pub async fn prune_samples_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let res = SampleEntity::delete_many()
            .filter(SampleCol::Timestamp.lt(cutoff.timestamp_millis()))
            .exec(self.db())
            .await?;
        if res.rows_affected > 0 {
            tracing::info!(removed = res.rows_affected, cutoff = %cutoff, "pruned samples");
        }
        Ok(res.rows_affected)
    }
}
