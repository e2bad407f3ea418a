//! SeaORM entities for the raw-material stock ledger schema.

pub mod by_product;
pub mod cleaning_job;
pub mod cleaning_log;
pub mod current_stock;
pub mod finished_good;
pub mod id_sequence;
pub mod processing_job;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod raw_material_product;
pub mod rm_quality_parameter;
pub mod rm_quality_report;
pub mod stock_entry;
pub mod unfinished_stock;
pub mod vendor;
pub mod warehouse;
