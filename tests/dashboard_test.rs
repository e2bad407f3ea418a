//! Dashboard aggregation endpoints against seeded ledger state.

mod common;

use common::{dec_field, id_of, TestApp};
use http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn dashboards_are_empty_on_a_fresh_database() {
    let app = TestApp::spawn().await;

    let (status, total) = app.get("/raw/dashboard/total-stock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&total, "total_quantity"), dec!(0));
    assert_eq!(total["rows"].as_array().map(Vec::len), Some(0));

    let (status, pending) = app.get("/raw/dashboard/pending-pos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().map(Vec::len), Some(0));

    let (status, cleaning) = app.get("/raw/dashboard/under-cleaning").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&cleaning, "total_quantity"), dec!(0));
    assert_eq!(cleaning["job_count"], json!(0));

    let (status, processing) = app.get("/raw/dashboard/in-processing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&processing, "total_quantity"), dec!(0));

    let (status, low) = app.get("/raw/dashboard/low-stock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(low.as_array().map(Vec::len), Some(0));

    let (status, waste) = app.get("/raw/dashboard/waste-stock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&waste, "total_quantity"), dec!(0));
}

#[tokio::test]
async fn total_stock_sums_balances_across_warehouses() {
    let app = TestApp::spawn().await;
    let first = app.seed_warehouse("North").await;
    let second = app.seed_warehouse("South").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let material = app.seed_product("WHEAT-01", "10").await;
    app.receive_stock(vendor, material, first, "70").await;
    app.receive_stock(vendor, material, second, "30").await;

    let (status, total) = app.get("/raw/dashboard/total-stock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&total, "total_quantity"), dec!(100));
    assert_eq!(total["rows"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn pending_pos_report_the_unreceived_remainder() {
    let app = TestApp::spawn().await;
    let warehouse = app.seed_warehouse("Central").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let material = app.seed_product("WHEAT-01", "10").await;

    let (_, body) = app
        .post(
            "/raw/purchase",
            json!({
                "vendor_id": vendor,
                "order_date": chrono::Utc::now(),
                "expected_date": chrono::Utc::now(),
                "items": [{
                    "raw_material_id": material,
                    "quantity_ordered": "100",
                    "rate": "12.00",
                }],
            }),
        )
        .await;
    let item_id = id_of(&body["items"][0]);

    app.put(
        &format!("/raw/purchase/item/{}", item_id),
        json!({ "delta_received": "35", "warehouse_id": warehouse }),
    )
    .await;

    let (status, pending) = app.get("/raw/dashboard/pending-pos").await;
    assert_eq!(status, StatusCode::OK);
    let rows = pending.as_array().expect("pending rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(dec_field(&rows[0], "quantity_pending"), dec!(65));
    assert_eq!(rows[0]["status"], json!("Partially-Received"));

    // Service-level pending listing agrees with the report.
    let items = app
        .services
        .purchase_orders
        .pending_items()
        .await
        .expect("pending items");
    assert_eq!(items.len(), 1);

    // Fully received items drop off the report.
    app.put(
        &format!("/raw/purchase/item/{}", item_id),
        json!({ "delta_received": "65", "warehouse_id": warehouse }),
    )
    .await;
    let (_, pending) = app.get("/raw/dashboard/pending-pos").await;
    assert_eq!(pending.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn under_cleaning_counts_open_jobs_only() {
    let app = TestApp::spawn().await;
    let source = app.seed_warehouse("Raw Store").await;
    let destination = app.seed_warehouse("Clean Store").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let material = app.seed_product("RICE-02", "10").await;
    app.receive_stock(vendor, material, source, "100").await;

    app.post(
        "/raw/cleaning",
        json!({
            "raw_material_id": material,
            "from_warehouse_id": source,
            "to_warehouse_id": destination,
            "quantity": "30",
        }),
    )
    .await;
    let (_, resolved_job) = app
        .post(
            "/raw/cleaning",
            json!({
                "raw_material_id": material,
                "from_warehouse_id": source,
                "to_warehouse_id": destination,
                "quantity": "20",
            }),
        )
        .await;
    app.put(
        &format!("/raw/cleaning/{}", id_of(&resolved_job)),
        json!({ "status": "Cleaned" }),
    )
    .await;

    let (status, cleaning) = app.get("/raw/dashboard/under-cleaning").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&cleaning, "total_quantity"), dec!(30));
    assert_eq!(cleaning["job_count"], json!(1));
}

#[tokio::test]
async fn low_stock_flags_strictly_below_the_reorder_level() {
    let app = TestApp::spawn().await;
    let warehouse = app.seed_warehouse("Central").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let short = app.seed_product("WHEAT-01", "50").await;
    let exact = app.seed_product("RICE-02", "50").await;
    app.receive_stock(vendor, short, warehouse, "40").await;
    app.receive_stock(vendor, exact, warehouse, "50").await;

    let (status, low) = app.get("/raw/dashboard/low-stock").await;
    assert_eq!(status, StatusCode::OK);
    let rows = low.as_array().expect("alert rows");
    assert_eq!(rows.len(), 1, "{}", low);
    assert_eq!(rows[0]["raw_material_id"], json!(short));
    assert_eq!(dec_field(&rows[0], "total_quantity"), dec!(40));
    assert_eq!(dec_field(&rows[0], "min_reorder_level"), dec!(50));
}

#[tokio::test]
async fn waste_stock_sums_unfinished_and_by_products() {
    let app = TestApp::spawn().await;
    let source = app.seed_warehouse("Raw Store").await;
    let destination = app.seed_warehouse("Clean Store").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let material = app.seed_product("RICE-02", "10").await;
    app.receive_stock(vendor, material, source, "100").await;

    let (_, job) = app
        .post(
            "/raw/cleaning",
            json!({
                "raw_material_id": material,
                "from_warehouse_id": source,
                "to_warehouse_id": destination,
                "quantity": "100",
            }),
        )
        .await;
    app.put(
        &format!("/raw/cleaning/{}", id_of(&job)),
        json!({ "status": "Cleaned", "leftover_quantity": "5" }),
    )
    .await;

    let (_, job) = app
        .post(
            "/raw/processing",
            json!({
                "input_raw_material_id": material,
                "source_warehouse_id": destination,
                "quantity_input": "95",
            }),
        )
        .await;
    app.put(
        &format!("/raw/processing/{}", id_of(&job)),
        json!({
            "status": "Finished",
            "by_products": [{
                "sku_code": "RICE-02-HUSK",
                "quantity": "10",
                "warehouse_id": destination,
            }],
        }),
    )
    .await;

    let (status, waste) = app.get("/raw/dashboard/waste-stock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&waste, "unfinished_quantity"), dec!(5));
    assert_eq!(dec_field(&waste, "by_product_quantity"), dec!(10));
    assert_eq!(dec_field(&waste, "total_quantity"), dec!(15));
}
