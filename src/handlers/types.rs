//! # Common API Types
//!
//! Response bodies shared by the account and dashboard handlers. Field names
//! are camelCase on the wire, matching what the dashboard front end reads.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::identity::AuthTokens;
use crate::models::event::EventStatus;
use crate::models::event_config::ConfirmationType;
use crate::models::{address, company, event, event_config};
use crate::repositories::EventDetails;

/// `{ "success": true }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Acknowledgement of an account operation, echoing the email it applied to
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailResponse {
    pub success: bool,
    #[schema(example = "contato@empresa.com.br")]
    pub email: String,
}

impl EmailResponse {
    pub fn ok(email: String) -> Self {
        Self {
            success: true,
            email,
        }
    }
}

/// Successful login. The access token is also set as the session cookie.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub email: String,
    /// Absent when the provider answered with a challenge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<AuthTokens>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyDto {
    pub id: Uuid,
    /// Tax document (CNPJ)
    #[schema(example = "12.345.678/0001-90")]
    pub document: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub owner: String,
}

impl From<company::Model> for CompanyDto {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            document: model.document,
            name: model.name,
            email: model.email,
            phone: model.phone,
            owner: model.owner,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    pub success: bool,
    /// Absent when the credential exists but owns no company yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub id: Uuid,
    pub street: String,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

impl From<address::Model> for AddressDto {
    fn from(model: address::Model) -> Self {
        Self {
            id: model.id,
            street: model.street,
            number: model.number,
            complement: model.complement,
            neighborhood: model.neighborhood,
            city: model.city,
            state: model.state,
            country: model.country,
            zip_code: model.zip_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventConfigDto {
    pub id: Uuid,
    pub confirmation_type: ConfirmationType,
    pub has_gift: bool,
    pub gift_description: String,
    pub has_prize: bool,
    pub prize_description: String,
}

impl From<event_config::Model> for EventConfigDto {
    fn from(model: event_config::Model) -> Self {
        Self {
            id: model.id,
            confirmation_type: model.confirmation_type,
            has_gift: model.has_gift,
            gift_description: model.gift_description,
            has_prize: model.has_prize,
            prize_description: model.prize_description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub address_id: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    /// Public logo URL, empty when no logo was uploaded
    pub image_url: String,
    pub start_date: DateTime<FixedOffset>,
    pub end_date: DateTime<FixedOffset>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    /// Lifecycle label derived from the schedule at response time
    pub status: EventStatus,
}

impl EventDto {
    pub fn from_model(model: event::Model, now: DateTime<Utc>) -> Self {
        let status = model.status_at(now);
        Self {
            id: model.id,
            company_id: model.company_id,
            address_id: model.address_id,
            name: model.name,
            description: model.description,
            slug: model.slug,
            image_url: model.image_url,
            start_date: model.start_date,
            end_date: model.end_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
            status,
        }
    }
}

/// An event with its address and configuration rows.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDetailDto {
    #[serde(flatten)]
    pub event: EventDto,
    pub address: Option<AddressDto>,
    /// Configuration rows, oldest first; the dashboard edits the first one
    #[serde(rename = "eventConfig")]
    pub event_config: Vec<EventConfigDto>,
}

impl EventDetailDto {
    pub fn from_details(details: EventDetails, now: DateTime<Utc>) -> Self {
        Self {
            event: EventDto::from_model(details.event, now),
            address: details.address.map(AddressDto::from),
            event_config: details
                .configs
                .into_iter()
                .map(EventConfigDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub success: bool,
    pub event: EventDetailDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventsResponse {
    pub success: bool,
    pub events: Vec<EventDto>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct VerifySlugRequest {
    #[serde(default)]
    #[schema(example = "festa-de-lancamento")]
    pub slug: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifySlugResponse {
    /// True when another live or recently ended event holds the slug
    pub exists: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_event(now: DateTime<Utc>) -> event::Model {
        let stamp = now.fixed_offset();
        event::Model {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            address_id: Uuid::new_v4(),
            name: "Lançamento".to_string(),
            description: "Festa".to_string(),
            slug: "lancamento".to_string(),
            image_url: String::new(),
            start_date: (now + Duration::days(2)).fixed_offset(),
            end_date: (now + Duration::days(3)).fixed_offset(),
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn event_detail_flattens_event_fields() {
        let now = Utc::now();
        let details = EventDetails {
            event: sample_event(now),
            address: None,
            configs: Vec::new(),
        };

        let value = serde_json::to_value(EventDetailDto::from_details(details, now)).unwrap();

        assert_eq!(value["slug"], "lancamento");
        assert_eq!(value["imageUrl"], "");
        assert_eq!(value["status"], "Em breve");
        assert!(value["address"].is_null());
        assert_eq!(value["eventConfig"], serde_json::json!([]));
    }

    #[test]
    fn login_response_omits_missing_tokens() {
        let body = LoginResponse {
            success: true,
            email: "a@b.com".to_string(),
            tokens: None,
        };
        let value = serde_json::to_value(body).unwrap();
        assert!(value.get("tokens").is_none());
    }
}
