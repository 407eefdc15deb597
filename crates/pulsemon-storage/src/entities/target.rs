use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "targets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub api_key: String,
    pub last_seen: Option<DateTimeWithTimeZone>,
    pub source_address: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::metric_sample::Entity")]
    MetricSample,
}

impl Related<super::metric_sample::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MetricSample.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
