//! # Repository Layer
//!
//! Data access for accounts (credential, company, address) and events,
//! always scoped to the owning company where a tenant applies.

pub mod account;
pub mod event;

use sea_orm::Set;

use crate::models::address;
use crate::validation::AddressInput;

pub use account::{AccountRepository, NewCompany};
pub use event::{EventDetails, EventRepository};

/// Copies form address fields onto an address row.
pub(crate) fn fill_address(model: &mut address::ActiveModel, input: AddressInput) {
    model.street = Set(input.street);
    model.number = Set(input.number);
    model.complement = Set(input.complement);
    model.neighborhood = Set(input.neighborhood);
    model.city = Set(input.city);
    model.state = Set(input.state);
    model.country = Set(input.country);
    model.zip_code = Set(input.zip_code);
}
