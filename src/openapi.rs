use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rawstock API",
        version = "0.1.0",
        description = r#"
Raw-material inventory backend built around a stock conservation ledger.

Every quantity movement is an append-only stock entry (IN, OUT, RESERVED,
RELEASED); per (material, warehouse) balances are kept in an aggregate that
can always be rebuilt by replaying the ledger. Cleaning jobs reserve stock at
their source warehouse, processing jobs consume the derived cleaned pool, and
the dashboard endpoints aggregate over all of it.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "warehouses", description = "Warehouse master data"),
        (name = "vendors", description = "Vendor master data"),
        (name = "products", description = "Raw-material SKU master data"),
        (name = "purchase-orders", description = "Purchase orders and receiving"),
        (name = "stock", description = "Stock ledger and balances"),
        (name = "cleaning", description = "Cleaning job pipeline"),
        (name = "processing", description = "Processing job pipeline"),
        (name = "dashboard", description = "Read-only aggregations"),
        (name = "quality", description = "Raw-material quality reports")
    ),
    paths(
        crate::handlers::warehouses::create_warehouse,
        crate::handlers::warehouses::list_warehouses,
        crate::handlers::warehouses::get_warehouse,
        crate::handlers::warehouses::update_warehouse,
        crate::handlers::warehouses::delete_warehouse,

        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::update_vendor,

        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::receive_item,

        crate::handlers::stock::create_stock_entry,
        crate::handlers::stock::list_stock_entries,
        crate::handlers::stock::update_stock_entry,
        crate::handlers::stock::stock_distribution,

        crate::handlers::cleaning::create_cleaning_job,
        crate::handlers::cleaning::list_cleaning_jobs,
        crate::handlers::cleaning::get_cleaning_job,
        crate::handlers::cleaning::update_cleaning_job,
        crate::handlers::cleaning::cancel_cleaning_job,
        crate::handlers::cleaning::add_cleaning_log,
        crate::handlers::cleaning::list_cleaning_logs,
        crate::handlers::cleaning::cleaned_materials,

        crate::handlers::processing::create_processing_job,
        crate::handlers::processing::list_processing_jobs,
        crate::handlers::processing::get_processing_job,
        crate::handlers::processing::update_processing_job,
        crate::handlers::processing::cancel_processing_job,

        crate::handlers::dashboard::total_stock,
        crate::handlers::dashboard::pending_pos,
        crate::handlers::dashboard::under_cleaning,
        crate::handlers::dashboard::in_processing,
        crate::handlers::dashboard::low_stock,
        crate::handlers::dashboard::waste_stock,

        crate::handlers::quality::create_quality_report,
        crate::handlers::quality::list_quality_reports,
        crate::handlers::quality::get_quality_report,
        crate::handlers::quality::update_quality_report,
        crate::handlers::quality::delete_quality_report,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::handlers::warehouses::CreateWarehouseRequest,
        crate::handlers::warehouses::UpdateWarehouseRequest,
        crate::handlers::vendors::CreateVendorRequest,
        crate::handlers::vendors::UpdateVendorRequest,
        crate::handlers::products::CreateProductRequest,
        crate::handlers::products::UpdateProductRequest,
        crate::handlers::purchase_orders::CreatePurchaseOrderRequest,
        crate::handlers::purchase_orders::CreatePurchaseOrderItemRequest,
        crate::handlers::purchase_orders::ReceiveItemRequest,
        crate::handlers::stock::CreateStockEntryRequest,
        crate::handlers::stock::UpdateStockEntryRequest,
        crate::handlers::cleaning::CreateCleaningJobRequest,
        crate::handlers::cleaning::UpdateCleaningJobRequest,
        crate::handlers::cleaning::CreateCleaningLogRequest,
        crate::handlers::processing::CreateProcessingJobRequest,
        crate::handlers::processing::ByProductRequest,
        crate::handlers::processing::UpdateProcessingJobRequest,
        crate::handlers::quality::CreateQualityReportRequest,
        crate::handlers::quality::QualityParameterRequest,
        crate::handlers::quality::UpdateQualityReportRequest,
        crate::services::cleaning::CleanedMaterialRow,
        crate::services::current_stock::StockDistributionRow,
        crate::queries::dashboard::TotalStockRow,
        crate::queries::dashboard::TotalStockSummary,
        crate::queries::dashboard::PendingItemRow,
        crate::queries::dashboard::StockUnderCleaningSummary,
        crate::queries::dashboard::StockInProcessingSummary,
        crate::queries::dashboard::LowStockAlertRow,
        crate::queries::dashboard::WasteStockSummary,
    ))
)]
pub struct ApiDoc;

/// Swagger UI mounted at /docs, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
