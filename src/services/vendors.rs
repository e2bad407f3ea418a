//! Vendor master data. Vendor codes are sequence-backed display identifiers
//! generated at creation; disabling a vendor blocks new purchase orders but
//! leaves existing orders untouched.

use crate::{
    db::DbPool,
    entities::vendor,
    errors::ServiceError,
    events::{Event, EventSender},
    services::sequences,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub name: String,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub gstin: Option<String>,
    pub bank_details: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VendorPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub gstin: Option<String>,
    pub bank_details: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Clone)]
pub struct VendorService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl VendorService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a vendor with a generated `VND#####` code. The code and the
    /// row land in one transaction so a failed insert never burns a visible
    /// gap under concurrent creation.
    #[instrument(skip(self, input))]
    pub async fn create_vendor(&self, input: NewVendor) -> Result<vendor::Model, ServiceError> {
        let model = self
            .db_pool
            .transaction::<_, vendor::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let vendor_code =
                        sequences::next_display_number(txn, "vendor", "VND", 5).await?;
                    let now = Utc::now();

                    vendor::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        vendor_code: Set(vendor_code),
                        name: Set(input.name),
                        address: Set(input.address),
                        contact_name: Set(input.contact_name),
                        contact_phone: Set(input.contact_phone),
                        contact_email: Set(input.contact_email),
                        gstin: Set(input.gstin),
                        bank_details: Set(input.bank_details),
                        enabled: Set(true),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)
                })
            })
            .await
            .map_err(ServiceError::from)?;

        if let Err(e) = self.event_sender.send(Event::VendorCreated(model.id)).await {
            warn!(error = %e, "failed to publish vendor event");
        }

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_vendor(&self, id: Uuid) -> Result<vendor::Model, ServiceError> {
        vendor::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_vendors(&self) -> Result<Vec<vendor::Model>, ServiceError> {
        vendor::Entity::find()
            .order_by_asc(vendor::Column::VendorCode)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_vendor(
        &self,
        id: Uuid,
        patch: VendorPatch,
    ) -> Result<vendor::Model, ServiceError> {
        let existing = self.get_vendor(id).await?;

        let mut active: vendor::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(address) = patch.address {
            active.address = Set(Some(address));
        }
        if let Some(contact_name) = patch.contact_name {
            active.contact_name = Set(Some(contact_name));
        }
        if let Some(contact_phone) = patch.contact_phone {
            active.contact_phone = Set(Some(contact_phone));
        }
        if let Some(contact_email) = patch.contact_email {
            active.contact_email = Set(Some(contact_email));
        }
        if let Some(gstin) = patch.gstin {
            active.gstin = Set(Some(gstin));
        }
        if let Some(bank_details) = patch.bank_details {
            active.bank_details = Set(Some(bank_details));
        }
        if let Some(enabled) = patch.enabled {
            active.enabled = Set(enabled);
        }
        active.updated_at = Set(Utc::now());

        active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
