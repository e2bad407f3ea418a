pub mod cleaning;
pub mod current_stock;
pub mod processing;
pub mod products;
pub mod purchase_orders;
pub mod quality;
pub mod sequences;
pub mod stock_entries;
pub mod vendors;
pub mod warehouses;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub warehouses: Arc<warehouses::WarehouseService>,
    pub vendors: Arc<vendors::VendorService>,
    pub products: Arc<products::ProductService>,
    pub purchase_orders: Arc<purchase_orders::PurchaseOrderService>,
    pub stock_entries: Arc<stock_entries::StockEntryService>,
    pub current_stock: Arc<current_stock::CurrentStockService>,
    pub cleaning: Arc<cleaning::CleaningService>,
    pub processing: Arc<processing::ProcessingService>,
    pub quality: Arc<quality::QualityService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            warehouses: Arc::new(warehouses::WarehouseService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            vendors: Arc::new(vendors::VendorService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            products: Arc::new(products::ProductService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            purchase_orders: Arc::new(purchase_orders::PurchaseOrderService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            stock_entries: Arc::new(stock_entries::StockEntryService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            current_stock: Arc::new(current_stock::CurrentStockService::new(db_pool.clone())),
            cleaning: Arc::new(cleaning::CleaningService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            processing: Arc::new(processing::ProcessingService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            quality: Arc::new(quality::QualityService::new(db_pool, event_sender)),
        }
    }
}
