//! Event entity model
//!
//! Events are owned by a company and carry their own address row and at
//! least one configuration row.

use chrono::{DateTime, Utc};
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub address_id: Uuid,
    pub name: String,
    pub description: String,

    /// Public URL segment. Not unique at the storage level.
    pub slug: String,

    /// Public logo URL, empty until an upload succeeds
    pub image_url: String,

    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    #[sea_orm(
        belongs_to = "super::address::Entity",
        from = "Column::AddressId",
        to = "super::address::Column::Id"
    )]
    Address,
    #[sea_orm(has_many = "super::event_config::Entity")]
    EventConfig,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<super::event_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lifecycle label shown next to an event on the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EventStatus {
    #[serde(rename = "Aguardando")]
    Waiting,
    #[serde(rename = "Em breve")]
    Soon,
    #[serde(rename = "Em andamento")]
    InProgress,
    #[serde(rename = "Finalizado")]
    Finished,
}

impl EventStatus {
    /// Days before the start at which an event counts as "soon".
    pub const SOON_WINDOW_DAYS: i64 = 7;

    /// Derive the status of an event scheduled between `start` and `end` as seen at `now`.
    pub fn at(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now > end {
            Self::Finished
        } else if now > start {
            Self::InProgress
        } else if (start - now).num_days() <= Self::SOON_WINDOW_DAYS {
            Self::Soon
        } else {
            Self::Waiting
        }
    }
}

impl Model {
    /// Status of this event at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> EventStatus {
        EventStatus::at(
            self.start_date.with_timezone(&Utc),
            self.end_date.with_timezone(&Utc),
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn status_follows_schedule() {
        let now = Utc::now();

        let finished = EventStatus::at(now - Duration::days(3), now - Duration::days(1), now);
        assert_eq!(finished, EventStatus::Finished);

        let running = EventStatus::at(now - Duration::hours(1), now + Duration::hours(5), now);
        assert_eq!(running, EventStatus::InProgress);

        let soon = EventStatus::at(now + Duration::days(7), now + Duration::days(8), now);
        assert_eq!(soon, EventStatus::Soon);

        let waiting = EventStatus::at(now + Duration::days(9), now + Duration::days(10), now);
        assert_eq!(waiting, EventStatus::Waiting);
    }

    #[test]
    fn status_serializes_with_dashboard_labels() {
        let value = serde_json::to_value(EventStatus::InProgress).unwrap();
        assert_eq!(value, "Em andamento");
    }
}
