//! # Event Repository
//!
//! Read access to events. Writes happen in [`crate::events`], inside a transaction.

use chrono::{DateTime, Months, Utc};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{address, event, event_config};

/// An event with its address and configuration rows (oldest first).
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetails {
    pub event: event::Model,
    pub address: Option<address::Model>,
    pub configs: Vec<event_config::Model>,
}

pub struct EventRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EventRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// All events of the company, earliest start first.
    pub async fn list_for_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<event::Model>, RepositoryError> {
        event::Entity::find()
            .filter(event::Column::CompanyId.eq(company_id))
            .order_by_asc(event::Column::StartDate)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_slug_for_company(
        &self,
        company_id: Uuid,
        slug: &str,
    ) -> Result<Option<EventDetails>, RepositoryError> {
        let event = event::Entity::find()
            .filter(event::Column::CompanyId.eq(company_id))
            .filter(event::Column::Slug.eq(slug))
            .order_by_asc(event::Column::CreatedAt)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        match event {
            Some(event) => Ok(Some(load_details(self.db, event).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id_for_company(
        &self,
        company_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<EventDetails>, RepositoryError> {
        let event = event::Entity::find_by_id(event_id)
            .filter(event::Column::CompanyId.eq(company_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        match event {
            Some(event) => Ok(Some(load_details(self.db, event).await?)),
            None => Ok(None),
        }
    }

    /// Whether `slug` is held by any event, across all companies, that has not
    /// ended or ended less than one calendar month before `now`.
    ///
    /// Advisory only: nothing stops a concurrent writer from taking the slug
    /// between this check and an insert.
    pub async fn slug_in_use(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let grace_cutoff = now.checked_sub_months(Months::new(1)).unwrap_or(now);

        let holder = event::Entity::find()
            .filter(event::Column::Slug.eq(slug))
            .filter(
                Condition::any()
                    .add(event::Column::EndDate.gt(now.fixed_offset()))
                    .add(event::Column::EndDate.gte(grace_cutoff.fixed_offset())),
            )
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(holder.is_some())
    }
}

/// Loads the address and configuration rows of `event` over any connection,
/// so the upsert can read back inside its transaction.
pub(crate) async fn load_details<C: ConnectionTrait>(
    db: &C,
    event: event::Model,
) -> Result<EventDetails, RepositoryError> {
    let address = address::Entity::find_by_id(event.address_id)
        .one(db)
        .await
        .map_err(RepositoryError::database_error)?;

    let configs = event_config::Entity::find()
        .filter(event_config::Column::EventId.eq(event.id))
        .order_by_asc(event_config::Column::CreatedAt)
        .all(db)
        .await
        .map_err(RepositoryError::database_error)?;

    Ok(EventDetails {
        event,
        address,
        configs,
    })
}
