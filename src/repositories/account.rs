//! # Account Repository
//!
//! A registered account is a credential (the identity provider's subject id)
//! owning a company, which has an address.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use super::fill_address;
use crate::error::RepositoryError;
use crate::models::{address, company, credential};
use crate::validation::AddressInput;

/// Company fields captured at registration
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub document: String,
    pub owner: String,
    pub email: String,
    pub phone: String,
}

pub struct AccountRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AccountRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts credential, address and company in one transaction.
    pub async fn register_company(
        &self,
        cognito_id: &str,
        company: NewCompany,
        address: AddressInput,
    ) -> Result<company::Model, RepositoryError> {
        if cognito_id.is_empty() {
            return Err(RepositoryError::validation_error(
                "identity subject cannot be empty",
            ));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;
        let now = Utc::now().fixed_offset();

        let result = async {
            let credential = credential::ActiveModel {
                id: Set(Uuid::new_v4()),
                cognito_id: Set(cognito_id.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;

            let mut address_row = address::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            fill_address(&mut address_row, address);
            let address_row = address_row.insert(&txn).await?;

            company::ActiveModel {
                id: Set(Uuid::new_v4()),
                credential_id: Set(credential.id),
                address_id: Set(address_row.id),
                name: Set(company.name),
                document: Set(company.document),
                owner: Set(company.owner),
                email: Set(company.email),
                phone: Set(company.phone),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
        }
        .await;

        match result {
            Ok(company) => {
                txn.commit()
                    .await
                    .map_err(RepositoryError::database_error)?;
                Ok(company)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!(error = %rollback_err, "registration rollback failed");
                }
                Err(RepositoryError::database_error(err))
            }
        }
    }

    /// The company owned by the credential with this subject id.
    ///
    /// A credential owns one company; should there be more, the oldest wins.
    pub async fn find_company_for_subject(
        &self,
        cognito_id: &str,
    ) -> Result<Option<company::Model>, RepositoryError> {
        company::Entity::find()
            .join(JoinType::InnerJoin, company::Relation::Credential.def())
            .filter(credential::Column::CognitoId.eq(cognito_id))
            .order_by_asc(company::Column::CreatedAt)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_company(
        &self,
        company_id: Uuid,
    ) -> Result<Option<company::Model>, RepositoryError> {
        company::Entity::find_by_id(company_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_credential(
        &self,
        cognito_id: &str,
    ) -> Result<Option<credential::Model>, RepositoryError> {
        credential::Entity::find()
            .filter(credential::Column::CognitoId.eq(cognito_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
