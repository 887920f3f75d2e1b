//! Event create/update.
//!
//! Both paths write the address, the event and its first configuration row,
//! then upload the logo (when one was sent) and store its URL, all inside one
//! database transaction. A failed upload rolls back every row written before it,
//! so readers never see a half-applied event.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{address, event, event_config};
use crate::repositories::{EventDetails, fill_address};
use crate::storage::{ObjectStorage, StorageError, event_logo_key};
use crate::validation::EventInput;

#[derive(Debug, Error)]
pub enum EventWriteError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("logo upload failed: {0}")]
    Upload(#[from] StorageError),
    #[error("event {0} has no address")]
    MissingAddress(Uuid),
}

enum Target {
    Create { company_id: Uuid },
    Update(Box<EventDetails>),
}

pub struct EventWriter<'a> {
    db: &'a DatabaseConnection,
    storage: &'a dyn ObjectStorage,
}

impl<'a> EventWriter<'a> {
    pub fn new(db: &'a DatabaseConnection, storage: &'a dyn ObjectStorage) -> Self {
        Self { db, storage }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        input: EventInput,
    ) -> Result<EventDetails, EventWriteError> {
        self.run(Target::Create { company_id }, input).await
    }

    /// Updates `existing`, which the caller has already scoped to the company.
    pub async fn update(
        &self,
        existing: EventDetails,
        input: EventInput,
    ) -> Result<EventDetails, EventWriteError> {
        self.run(Target::Update(Box::new(existing)), input).await
    }

    async fn run(&self, target: Target, input: EventInput) -> Result<EventDetails, EventWriteError> {
        let txn = self.db.begin().await?;

        match self.write(&txn, target, input).await {
            Ok(details) => {
                txn.commit().await?;
                Ok(details)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!(error = %rollback_err, "event write rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn write(
        &self,
        txn: &DatabaseTransaction,
        target: Target,
        input: EventInput,
    ) -> Result<EventDetails, EventWriteError> {
        let now = Utc::now().fixed_offset();
        let EventInput {
            name,
            description,
            slug,
            address: address_input,
            start_date,
            end_date,
            confirmation_type,
            has_gift,
            gift_description,
            has_prize,
            prize_description,
            logo,
        } = input;

        let (address, mut event, configs) = match target {
            Target::Create { company_id } => {
                let mut address_row = address::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                fill_address(&mut address_row, address_input);
                let address = address_row.insert(txn).await?;

                let event = event::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    company_id: Set(company_id),
                    address_id: Set(address.id),
                    name: Set(name),
                    description: Set(description),
                    slug: Set(slug),
                    image_url: Set(String::new()),
                    start_date: Set(start_date.fixed_offset()),
                    end_date: Set(end_date.fixed_offset()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await?;

                let config = event_config::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    event_id: Set(event.id),
                    confirmation_type: Set(confirmation_type),
                    has_gift: Set(has_gift),
                    gift_description: Set(gift_description),
                    has_prize: Set(has_prize),
                    prize_description: Set(prize_description),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await?;

                (address, event, vec![config])
            }
            Target::Update(existing) => {
                let EventDetails {
                    event: current,
                    address: current_address,
                    configs: mut current_configs,
                } = *existing;

                let current_address =
                    current_address.ok_or(EventWriteError::MissingAddress(current.id))?;
                let mut address_row: address::ActiveModel = current_address.into();
                fill_address(&mut address_row, address_input);
                address_row.updated_at = Set(now);
                let address = address_row.update(txn).await?;

                let mut event_row: event::ActiveModel = current.into();
                event_row.name = Set(name);
                event_row.description = Set(description);
                event_row.slug = Set(slug);
                event_row.start_date = Set(start_date.fixed_offset());
                event_row.end_date = Set(end_date.fixed_offset());
                event_row.updated_at = Set(now);
                let event = event_row.update(txn).await?;

                // Only the first configuration row is ever edited
                let config = if current_configs.is_empty() {
                    event_config::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        event_id: Set(event.id),
                        confirmation_type: Set(confirmation_type),
                        has_gift: Set(has_gift),
                        gift_description: Set(gift_description),
                        has_prize: Set(has_prize),
                        prize_description: Set(prize_description),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?
                } else {
                    let mut config_row: event_config::ActiveModel =
                        current_configs.remove(0).into();
                    config_row.confirmation_type = Set(confirmation_type);
                    config_row.has_gift = Set(has_gift);
                    config_row.gift_description = Set(gift_description);
                    config_row.has_prize = Set(has_prize);
                    config_row.prize_description = Set(prize_description);
                    config_row.updated_at = Set(now);
                    config_row.update(txn).await?
                };
                current_configs.insert(0, config);

                (address, event, current_configs)
            }
        };

        if let Some(logo) = logo {
            let key = event_logo_key(event.id, logo.extension());
            let image_url = self
                .storage
                .put_object(&key, &logo.content_type, logo.bytes.clone())
                .await
                .map_err(|e| {
                    tracing::error!(
                        event_id = %event.id,
                        file_name = %logo.file_name,
                        file_type = %logo.content_type,
                        file_size = logo.size(),
                        error = %e,
                        "failed to upload event logo"
                    );
                    e
                })?;

            let mut event_row: event::ActiveModel = event.into();
            event_row.image_url = Set(image_url);
            event = event_row.update(txn).await?;
        }

        Ok(EventDetails {
            event,
            address: Some(address),
            configs,
        })
    }
}
