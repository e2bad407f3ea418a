//! End-to-end flows over the HTTP surface: purchase receiving, the cleaning
//! reservation lifecycle, processing, and the conservation ledger behind them.

mod common;

use chrono::Utc;
use common::{dec_field, id_of, TestApp};
use http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn receiving_a_purchase_order_builds_the_ledger_and_balance() {
    let app = TestApp::spawn().await;
    let warehouse = app.seed_warehouse("Central").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let material = app.seed_product("WHEAT-01", "10").await;

    let (status, body) = app
        .post(
            "/raw/purchase",
            json!({
                "vendor_id": vendor,
                "order_date": Utc::now(),
                "expected_date": Utc::now(),
                "items": [{
                    "raw_material_id": material,
                    "quantity_ordered": "100",
                    "rate": "25.50",
                }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let order_id = id_of(&body["order"]);
    let item_id = id_of(&body["items"][0]);
    let expected_po = format!("PO-{}-0001", Utc::now().format("%Y%m%d"));
    assert_eq!(body["order"]["po_number"], json!(expected_po));
    assert_eq!(body["order"]["status"], json!("Pending"));

    // First delta leaves the item partially received.
    let (status, item) = app
        .put(
            &format!("/raw/purchase/item/{}", item_id),
            json!({ "delta_received": "60", "warehouse_id": warehouse }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", item);
    assert_eq!(item["status"], json!("Partially-Received"));
    assert_eq!(dec_field(&item, "quantity_received"), dec!(60));

    // Second delta completes it and rolls the order up.
    let (status, item) = app
        .put(
            &format!("/raw/purchase/item/{}", item_id),
            json!({ "delta_received": "40", "warehouse_id": warehouse }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", item);
    assert_eq!(item["status"], json!("Received"));

    let (status, order) = app.get(&format!("/raw/purchase/{}", order_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["order"]["status"], json!("Received"));

    assert_eq!(app.balance(material, warehouse).await, dec!(100));
    assert_eq!(app.replayed_balance(material, warehouse).await, dec!(100));

    let (status, entries) = app
        .get(&format!(
            "/raw/stock?raw_material_id={}&warehouse_id={}&entry_type=IN",
            material, warehouse
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries.as_array().map(Vec::len), Some(2));
}

#[rstest::rstest]
#[case("0")]
#[case("-5")]
#[tokio::test]
async fn receiving_rejects_a_non_positive_delta(#[case] delta: &str) {
    let app = TestApp::spawn().await;
    let warehouse = app.seed_warehouse("Central").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let material = app.seed_product("WHEAT-01", "10").await;

    let (status, body) = app
        .post(
            "/raw/purchase",
            json!({
                "vendor_id": vendor,
                "order_date": Utc::now(),
                "expected_date": Utc::now(),
                "items": [{
                    "raw_material_id": material,
                    "quantity_ordered": "100",
                    "rate": "25.50",
                }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let item_id = id_of(&body["items"][0]);

    let (status, _) = app
        .put(
            &format!("/raw/purchase/item/{}", item_id),
            json!({ "delta_received": delta, "warehouse_id": warehouse }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn purchase_orders_require_at_least_one_item() {
    let app = TestApp::spawn().await;
    let vendor = app.seed_vendor("Agro Traders").await;

    let (status, body) = app
        .post(
            "/raw/purchase",
            json!({
                "vendor_id": vendor,
                "order_date": Utc::now(),
                "expected_date": Utc::now(),
                "items": [],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn creating_a_cleaning_job_reserves_stock_at_the_source() {
    let app = TestApp::spawn().await;
    let source = app.seed_warehouse("Raw Store").await;
    let destination = app.seed_warehouse("Clean Store").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let material = app.seed_product("RICE-02", "10").await;
    app.receive_stock(vendor, material, source, "100").await;

    let (status, job) = app
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
    assert_eq!(status, StatusCode::CREATED, "{}", job);
    assert_eq!(job["job_number"], json!("CJ00001"));
    assert_eq!(job["status"], json!("Sent"));

    // Reservation is immediate: the source balance drops before the job
    // resolves, so a competing job cannot double-book the same stock.
    assert_eq!(app.balance(material, source).await, dec!(0));

    let (status, body) = app
        .post(
            "/raw/cleaning",
            json!({
                "raw_material_id": material,
                "from_warehouse_id": source,
                "to_warehouse_id": destination,
                "quantity": "1",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
}

#[tokio::test]
async fn finalizing_a_cleaning_job_records_waste_and_feeds_the_cleaned_pool() {
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
    let job_id = id_of(&job);

    let (status, job) = app
        .put(
            &format!("/raw/cleaning/{}", job_id),
            json!({
                "status": "Cleaned",
                "leftover_quantity": "5",
                "leftover_reason": "stones",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", job);
    assert_eq!(job["status"], json!("Cleaned"));
    assert!(job["finished_at"].is_string());

    // Finalization releases the reservation and books the consumption in the
    // same transaction, so the ledger nets to the stored zero balance.
    assert_eq!(app.balance(material, source).await, dec!(0));
    assert_eq!(app.replayed_balance(material, source).await, dec!(0));

    let (status, pools) = app.get("/raw/cleaned-materials").await;
    assert_eq!(status, StatusCode::OK);
    let rows = pools.as_array().expect("array of pools");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["warehouse_id"], json!(destination));
    // The pool reports the net outcome: 100 reserved minus 5 waste.
    assert_eq!(dec_field(&rows[0], "cleaned_quantity"), dec!(95));
    assert_eq!(dec_field(&rows[0], "waste_quantity"), dec!(5));
    assert_eq!(dec_field(&rows[0], "available"), dec!(95));

    // Moving on to Finished afterwards must not book the consumption again.
    let (status, body) = app
        .put(
            &format!("/raw/cleaning/{}", job_id),
            json!({ "status": "Finished" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(app.replayed_balance(material, source).await, dec!(0));

    let (_, outs) = app
        .get(&format!(
            "/raw/stock?raw_material_id={}&warehouse_id={}&entry_type=OUT",
            material, source
        ))
        .await;
    assert_eq!(outs.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn leftover_larger_than_the_job_quantity_is_rejected() {
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
    let job_id = id_of(&job);

    let (status, body) = app
        .put(
            &format!("/raw/cleaning/{}", job_id),
            json!({ "status": "Cleaned", "leftover_quantity": "101" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
}

#[tokio::test]
async fn cancelling_a_cleaning_job_releases_the_reservation() {
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
                "quantity": "40",
            }),
        )
        .await;
    let job_id = id_of(&job);
    assert_eq!(app.balance(material, source).await, dec!(60));

    let (status, cancelled) = app
        .request(Method::POST, &format!("/raw/cleaning/{}/cancel", job_id), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", cancelled);
    assert_eq!(cancelled["status"], json!("Cancelled"));

    // Reservation and release cancel out on the ledger and in the aggregate.
    assert_eq!(app.balance(material, source).await, dec!(100));
    assert_eq!(app.replayed_balance(material, source).await, dec!(100));

    let (status, body) = app
        .request(Method::POST, &format!("/raw/cleaning/{}/cancel", job_id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn finalized_cleaning_jobs_cannot_be_cancelled() {
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
    let job_id = id_of(&job);

    let (status, _) = app
        .put(
            &format!("/raw/cleaning/{}", job_id),
            json!({ "status": "Cleaned" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(Method::POST, &format!("/raw/cleaning/{}/cancel", job_id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn waste_cannot_be_restated_after_finalization() {
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
    let job_id = id_of(&job);

    let (status, _) = app
        .put(
            &format!("/raw/cleaning/{}", job_id),
            json!({ "status": "Cleaned", "leftover_quantity": "5" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The waste figure was booked with the finalizing transition; a later
    // update must not pretend to accept a different one.
    let (status, body) = app
        .put(
            &format!("/raw/cleaning/{}", job_id),
            json!({ "status": "Finished", "leftover_quantity": "2" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (_, waste) = app.get("/raw/dashboard/waste-stock").await;
    assert_eq!(dec_field(&waste, "unfinished_quantity"), dec!(5));
}

#[tokio::test]
async fn finishing_a_processing_job_mints_one_finished_good() {
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
    let cleaning_id = id_of(&job);
    app.put(
        &format!("/raw/cleaning/{}", cleaning_id),
        json!({ "status": "Cleaned", "leftover_quantity": "5" }),
    )
    .await;

    let (status, job) = app
        .post(
            "/raw/processing",
            json!({
                "input_raw_material_id": material,
                "source_warehouse_id": destination,
                "quantity_input": "95",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", job);
    assert_eq!(job["job_number"], json!("PJ00001"));
    let processing_id = id_of(&job);

    // Running jobs subtract from the cleaned pool.
    let (_, pools) = app.get("/raw/cleaned-materials").await;
    assert_eq!(dec_field(&pools[0], "in_processing"), dec!(95));
    assert_eq!(dec_field(&pools[0], "available"), dec!(0));

    let (status, detail) = app
        .put(
            &format!("/raw/processing/{}", processing_id),
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
    assert_eq!(status, StatusCode::OK, "{}", detail);
    assert_eq!(detail["job"]["status"], json!("Finished"));
    assert_eq!(detail["finished_good"]["sku_code"], json!("RICE-02-FIN"));
    assert_eq!(dec_field(&detail["finished_good"], "quantity"), dec!(85));
    assert_eq!(detail["finished_good"]["warehouse_id"], json!(destination));

    // Finishing twice would mint a second finished good.
    let (status, body) = app
        .put(
            &format!("/raw/processing/{}", processing_id),
            json!({ "status": "Completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
}

#[tokio::test]
async fn updating_by_products_replaces_the_previous_set() {
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
        json!({ "status": "Cleaned" }),
    )
    .await;

    let (_, job) = app
        .post(
            "/raw/processing",
            json!({
                "input_raw_material_id": material,
                "source_warehouse_id": destination,
                "quantity_input": "50",
            }),
        )
        .await;
    let processing_id = id_of(&job);

    let (status, detail) = app
        .put(
            &format!("/raw/processing/{}", processing_id),
            json!({
                "by_products": [
                    { "sku_code": "RICE-02-HUSK", "quantity": "10", "warehouse_id": destination },
                    { "sku_code": "RICE-02-BRAN", "quantity": "5", "warehouse_id": destination },
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", detail);
    assert_eq!(detail["by_products"].as_array().map(Vec::len), Some(2));

    // The second array is the complete set: earlier rows must be gone and
    // the finished quantity must be computed from it alone.
    let (status, detail) = app
        .put(
            &format!("/raw/processing/{}", processing_id),
            json!({
                "status": "Finished",
                "by_products": [
                    { "sku_code": "RICE-02-STONE", "quantity": "2", "warehouse_id": destination },
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", detail);
    assert_eq!(detail["by_products"].as_array().map(Vec::len), Some(1));
    assert_eq!(detail["by_products"][0]["sku_code"], json!("RICE-02-STONE"));
    assert_eq!(dec_field(&detail["finished_good"], "quantity"), dec!(48));

    let (_, detail) = app
        .get(&format!("/raw/processing/{}", processing_id))
        .await;
    assert_eq!(detail["by_products"].as_array().map(Vec::len), Some(1));
    assert_eq!(detail["by_products"][0]["sku_code"], json!("RICE-02-STONE"));
}

#[tokio::test]
async fn by_products_cannot_exceed_the_processing_input() {
    let app = TestApp::spawn().await;
    let warehouse = app.seed_warehouse("Clean Store").await;
    let material = app.seed_product("RICE-02", "10").await;

    let (status, job) = app
        .post(
            "/raw/processing",
            json!({
                "input_raw_material_id": material,
                "source_warehouse_id": warehouse,
                "quantity_input": "50",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", job);
    let processing_id = id_of(&job);

    let (status, body) = app
        .put(
            &format!("/raw/processing/{}", processing_id),
            json!({
                "status": "Finished",
                "by_products": [{
                    "sku_code": "RICE-02-HUSK",
                    "quantity": "60",
                    "warehouse_id": warehouse,
                }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
}

#[tokio::test]
async fn cancelled_processing_jobs_return_their_input_to_the_pool() {
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
        json!({ "status": "Cleaned" }),
    )
    .await;

    let (_, job) = app
        .post(
            "/raw/processing",
            json!({
                "input_raw_material_id": material,
                "source_warehouse_id": destination,
                "quantity_input": "60",
            }),
        )
        .await;
    let processing_id = id_of(&job);

    let (_, pools) = app.get("/raw/cleaned-materials").await;
    assert_eq!(dec_field(&pools[0], "available"), dec!(40));

    let (status, cancelled) = app
        .request(
            Method::POST,
            &format!("/raw/processing/{}/cancel", processing_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", cancelled);
    assert_eq!(cancelled["status"], json!("Cancelled"));

    let (_, pools) = app.get("/raw/cleaned-materials").await;
    assert_eq!(dec_field(&pools[0], "available"), dec!(100));
}

#[tokio::test]
async fn warehouses_with_ledger_history_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let warehouse = app.seed_warehouse("Central").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let material = app.seed_product("WHEAT-01", "10").await;
    app.receive_stock(vendor, material, warehouse, "10").await;

    let (status, body) = app.delete(&format!("/raw/warehouse/{}", warehouse)).await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let empty = app.seed_warehouse("Unused").await;
    let (status, _) = app.delete(&format!("/raw/warehouse/{}", empty)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn job_numbers_are_sequential_per_pipeline() {
    let app = TestApp::spawn().await;
    let source = app.seed_warehouse("Raw Store").await;
    let destination = app.seed_warehouse("Clean Store").await;
    let vendor = app.seed_vendor("Agro Traders").await;
    let material = app.seed_product("RICE-02", "10").await;
    app.receive_stock(vendor, material, source, "100").await;

    for expected in ["CJ00001", "CJ00002", "CJ00003"] {
        let (status, job) = app
            .post(
                "/raw/cleaning",
                json!({
                    "raw_material_id": material,
                    "from_warehouse_id": source,
                    "to_warehouse_id": destination,
                    "quantity": "10",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", job);
        assert_eq!(job["job_number"], json!(expected));
    }
}
