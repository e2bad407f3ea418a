pub mod cleaning;
pub mod common;
pub mod dashboard;
pub mod health;
pub mod processing;
pub mod products;
pub mod purchase_orders;
pub mod quality;
pub mod stock;
pub mod vendors;
pub mod warehouses;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
