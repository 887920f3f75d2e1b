//! Event create/update form, submitted as multipart so it can carry a logo.

use axum::{body::Bytes, extract::Multipart};
use chrono::{DateTime, NaiveDateTime, Utc};
use validator::{Validate, ValidationErrors};

use super::{AddressInput, issues_from, rule_error};
use crate::error::{ApiError, ValidationIssue, bad_request};
use crate::models::event_config::ConfirmationType;

pub const LOGO_FIELD: &str = "logo";
pub const MAX_LOGO_BYTES: usize = 3 * 1024 * 1024;
pub const ALLOWED_LOGO_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// A file part received with the form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Extension used for the storage key: the text after the last `.`,
    /// or the whole name when it has none.
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or_default()
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Raw form fields, as text, before typing.
#[derive(Debug, Clone, Default, Validate)]
pub struct EventForm {
    #[validate(length(min = 1, message = "Título é obrigatório"))]
    pub name: String,
    #[validate(length(min = 1, message = "Descrição é obrigatória"))]
    pub description: String,
    #[validate(length(min = 1, message = "URL é obrigatória"))]
    pub slug: String,
    #[validate(length(min = 1, message = "CEP é obrigatório"))]
    pub address_zip_code: String,
    #[validate(length(min = 1, message = "Rua é obrigatória"))]
    pub address_street: String,
    pub address_number: Option<String>,
    pub address_complement: Option<String>,
    #[validate(length(min = 1, message = "Bairro é obrigatório"))]
    pub address_neighborhood: String,
    #[validate(length(min = 1, message = "Cidade é obrigatória"))]
    pub address_city: String,
    #[validate(length(min = 1, message = "Estado é obrigatório"))]
    pub address_state: String,
    #[validate(length(min = 1, message = "País é obrigatório"))]
    pub address_country: String,
    #[validate(length(min = 1, message = "Data de início é obrigatória"))]
    pub start_date: String,
    #[validate(length(min = 1, message = "Data de término é obrigatória"))]
    pub end_date: String,
    pub confirmation_type: String,
    pub has_gift: bool,
    pub gift_description: Option<String>,
    pub has_prize: bool,
    pub prize_description: Option<String>,
    pub logo: Option<UploadedFile>,
}

/// A validated, typed event form.
#[derive(Debug, Clone)]
pub struct EventInput {
    pub name: String,
    pub description: String,
    pub slug: String,
    pub address: AddressInput,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub confirmation_type: ConfirmationType,
    pub has_gift: bool,
    pub gift_description: String,
    pub has_prize: bool,
    pub prize_description: String,
    pub logo: Option<UploadedFile>,
}

impl EventForm {
    /// Reads every part of the multipart body. Unknown parts are ignored.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = EventForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(&e.body_text()))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == LOGO_FIELD {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&e.body_text()))?;
                // browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    form.logo = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| bad_request(&e.body_text()))?;
            form.set_text(&name, value);
        }

        Ok(form)
    }

    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "description" => self.description = value,
            "slug" => self.slug = value,
            "addressZipCode" => self.address_zip_code = value,
            "addressStreet" => self.address_street = value,
            "addressNumber" => self.address_number = non_empty(value),
            "addressComplement" => self.address_complement = non_empty(value),
            "addressNeighborhood" => self.address_neighborhood = value,
            "addressCity" => self.address_city = value,
            "addressState" => self.address_state = value,
            "addressCountry" => self.address_country = value,
            "startDate" => self.start_date = value,
            "endDate" => self.end_date = value,
            "confirmationType" => self.confirmation_type = value,
            "hasGift" => self.has_gift = value == "true",
            "giftDescription" => self.gift_description = non_empty(value),
            "hasPrize" => self.has_prize = value == "true",
            "prizeDescription" => self.prize_description = non_empty(value),
            _ => {}
        }
    }

    /// Checks every rule and converts the form into typed input.
    pub fn into_input(self) -> Result<EventInput, Vec<ValidationIssue>> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);

        let confirmation_type = if self.confirmation_type.is_empty() {
            errors.add(
                "confirmation_type",
                rule_error("required", "Tipo de confirmação é obrigatório"),
            );
            None
        } else {
            let parsed = ConfirmationType::parse(&self.confirmation_type);
            if parsed.is_none() {
                errors.add(
                    "confirmation_type",
                    rule_error("invalid_enum_value", "Tipo de confirmação inválido"),
                );
            }
            parsed
        };

        let start_date = parse_form_date(&self.start_date);
        if start_date.is_none() && !self.start_date.is_empty() {
            errors.add(
                "start_date",
                rule_error("invalid_date", "Data de início inválida"),
            );
        }
        let end_date = parse_form_date(&self.end_date);
        if end_date.is_none() && !self.end_date.is_empty() {
            errors.add(
                "end_date",
                rule_error("invalid_date", "Data de término inválida"),
            );
        }

        if let Some(logo) = &self.logo {
            if !ALLOWED_LOGO_TYPES.contains(&logo.content_type.as_str()) {
                errors.add(
                    "logo",
                    rule_error("invalid_type", "A logo deve ser uma imagem JPG ou PNG"),
                );
            }
            if logo.size() > MAX_LOGO_BYTES {
                errors.add(
                    "logo",
                    rule_error("too_big", "A logo deve ter no máximo 3 mb"),
                );
            }
        }

        let (Some(confirmation_type), Some(start_date), Some(end_date)) =
            (confirmation_type, start_date, end_date)
        else {
            return Err(issues_from(&errors));
        };
        if !errors.is_empty() {
            return Err(issues_from(&errors));
        }

        Ok(EventInput {
            name: self.name,
            description: self.description,
            slug: self.slug,
            address: AddressInput {
                street: self.address_street,
                number: self.address_number,
                complement: self.address_complement,
                neighborhood: self.address_neighborhood,
                city: self.address_city,
                state: self.address_state,
                country: self.address_country,
                zip_code: self.address_zip_code,
            },
            start_date,
            end_date,
            confirmation_type,
            has_gift: self.has_gift,
            gift_description: self.gift_description.unwrap_or_default(),
            has_prize: self.has_prize,
            prize_description: self.prize_description.unwrap_or_default(),
            logo: self.logo,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Accepts RFC 3339, or the `datetime-local` form (`YYYY-MM-DDTHH:MM[:SS]`) read as UTC.
pub fn parse_form_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
