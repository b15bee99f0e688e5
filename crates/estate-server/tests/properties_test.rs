mod helpers;

use axum::http::StatusCode;
use helpers::{TestClient, assert_error_body, assert_search_page_schema, client, draft};
use serde_json::{Value, json};

const ALICE: &str = "alice";
const BOB: &str = "bob";

/// Client with three listings owned by alice and one by bob.
async fn seeded() -> TestClient {
    let client = client();
    for (title, state, city, price) in [
        ("Harbor view", "California", "San Diego", 650_000.0),
        ("Hill cottage", "California", "Oakland", 480_000.0),
        ("Prairie home", "Texas", "Austin", 310_000.0),
    ] {
        client
            .post_json("/properties", Some(ALICE), &draft(title, state, city, price))
            .await
            .assert_status(StatusCode::CREATED);
    }
    client
        .post_json("/properties", Some(BOB), &draft("Loft", "Texas", "Dallas", 275_000.0))
        .await
        .assert_status(StatusCode::CREATED);
    client
}

// === Reads ===

#[tokio::test]
async fn list_is_a_miss_then_a_hit() {
    let client = seeded().await;

    let first = client.get("/properties").await;
    first.assert_status(StatusCode::OK).assert_cache("MISS");

    let second = client.get("/properties").await;
    second.assert_cache("HIT");

    let listings: Vec<Value> = second.json();
    assert_eq!(listings.len(), 4);
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn create_assigns_sequential_ids() {
    let client = seeded().await;

    let created: Value = client
        .post_json("/properties", Some(BOB), &draft("Annex", "Ohio", "Dayton", 99_000.0))
        .await
        .json();

    assert_eq!(created["id"], "PROP0005");
    assert_eq!(created["ownerId"], BOB);
}

#[tokio::test]
async fn detail_returns_listing() {
    let client = seeded().await;

    let response = client.get("/properties/PROP0002").await;
    response.assert_status(StatusCode::OK).assert_cache("MISS");

    let listing: Value = response.json();
    assert_eq!(listing["title"], "Hill cottage");

    client.get("/properties/PROP0002").await.assert_cache("HIT");
}

#[tokio::test]
async fn missing_detail_is_404_and_not_cached() {
    let client = seeded().await;

    let response = client.get("/properties/PROP0404").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_error_body(&response.json(), "Not Found");
    assert!(response.header("x-cache").is_none());

    client
        .get("/properties/PROP0404")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_returns_paginated_shape() {
    let client = seeded().await;

    let response = client
        .get("/properties/search?state=california&sortBy=price&sortOrder=asc&limit=1")
        .await;
    response.assert_status(StatusCode::OK).assert_cache("MISS");

    let page: Value = response.json();
    assert_search_page_schema(&page);
    assert_eq!(page["pagination"]["totalResults"], 2);
    assert_eq!(page["pagination"]["totalPages"], 2);
    assert_eq!(page["pagination"]["hasNextPage"], true);
    assert_eq!(page["data"][0]["title"], "Hill cottage");
}

#[tokio::test]
async fn reordered_search_params_share_a_cache_entry() {
    let client = seeded().await;

    client
        .get("/properties/search?state=Texas&minPrice=300000")
        .await
        .assert_cache("MISS");

    let response = client
        .get("/properties/search?minPrice=300000&state=Texas&utm_source=mail")
        .await;
    response.assert_cache("HIT");

    let page: Value = response.json();
    assert_eq!(page["pagination"]["totalResults"], 1);
    assert_eq!(page["data"][0]["city"], "Austin");
}

#[tokio::test]
async fn filter_options_summarize_listings() {
    let client = seeded().await;

    let options: Value = client.get("/properties/filter-options").await.json();

    assert_eq!(options["states"], json!(["California", "Texas"]));
    assert_eq!(options["priceRange"]["min"], 275_000.0);
    assert_eq!(options["priceRange"]["max"], 650_000.0);
}

#[tokio::test]
async fn user_listings_are_scoped_to_owner() {
    let client = seeded().await;

    let alice: Vec<Value> = client.get("/users/alice/properties").await.json();
    let bob: Vec<Value> = client.get("/users/bob/properties").await.json();
    let nobody = client.get("/users/carol/properties").await;

    assert_eq!(alice.len(), 3);
    assert_eq!(bob.len(), 1);
    nobody.assert_status(StatusCode::OK);
    assert_eq!(nobody.json::<Vec<Value>>().len(), 0);
}

// === Writes ===

#[tokio::test]
async fn write_without_user_is_401() {
    let client = client();

    let response = client
        .post_json("/properties", None, &draft("Nope", "Ohio", "Dayton", 1.0))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_error_body(&response.json(), "Unauthorized");
}

#[tokio::test]
async fn invalid_draft_is_400() {
    let client = client();

    let mut payload = draft("Bad", "Ohio", "Dayton", 1.0);
    payload["price"] = json!(-5.0);

    let response = client.post_json("/properties", Some(ALICE), &payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_body(&response.json(), "Bad Request");
}

#[tokio::test]
async fn update_by_non_owner_is_403() {
    let client = seeded().await;

    client
        .put_json("/properties/PROP0001", Some(BOB), &json!({"price": 1.0}))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    client
        .put_json("/properties/PROP0999", Some(BOB), &json!({"price": 1.0}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_invalidates_detail_listing_and_search() {
    let client = seeded().await;

    // Populate the caches
    client.get("/properties").await;
    client.get("/properties/PROP0001").await;
    client.get("/properties/search?city=San%20Diego").await;
    client.get("/users/alice/properties").await;
    client.get("/users/bob/properties").await;
    client.get("/properties/search?city=San%20Diego").await.assert_cache("HIT");

    let response = client
        .put_json("/properties/PROP0001", Some(ALICE), &json!({"price": 600000.0}))
        .await;
    response.assert_status(StatusCode::OK);
    assert!(response.header("x-cache-warning").is_none());
    let purged: usize = response.header("x-cache-invalidated").unwrap().parse().unwrap();
    assert!(purged >= 4, "expected at least 4 purged entries, got {purged}");

    let detail = client.get("/properties/PROP0001").await;
    detail.assert_cache("MISS");
    assert_eq!(detail.json::<Value>()["price"], 600000.0);

    client.get("/properties").await.assert_cache("MISS");
    client.get("/users/alice/properties").await.assert_cache("MISS");
    client.get("/users/bob/properties").await.assert_cache("HIT");

    let search = client.get("/properties/search?city=San%20Diego").await;
    search.assert_cache("MISS");
    assert_eq!(search.json::<Value>()["data"][0]["price"], 600000.0);
}

#[tokio::test]
async fn create_makes_new_listing_visible_immediately() {
    let client = seeded().await;

    client.get("/properties").await.assert_cache("MISS");
    client.get("/properties/search?state=Ohio").await;

    client
        .post_json("/properties", Some(BOB), &draft("Lake house", "Ohio", "Toledo", 200_000.0))
        .await
        .assert_status(StatusCode::CREATED);

    let all: Vec<Value> = client.get("/properties").await.json();
    assert_eq!(all.len(), 5);

    let search: Value = client.get("/properties/search?state=Ohio").await.json();
    assert_eq!(search["pagination"]["totalResults"], 1);
}

#[tokio::test]
async fn delete_removes_listing() {
    let client = seeded().await;
    client.get("/properties/PROP0004").await.assert_status(StatusCode::OK);

    client
        .delete("/properties/PROP0004", Some(ALICE))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = client.delete("/properties/PROP0004", Some(BOB)).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["id"], "PROP0004");

    client
        .get("/properties/PROP0004")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn import_reports_each_draft() {
    let client = seeded().await;
    client.get("/properties/filter-options").await;

    let mut bad = draft("Broken", "Ohio", "Dayton", 1.0);
    bad["title"] = json!("");
    let mut duplicate = draft("Copy", "Ohio", "Dayton", 1.0);
    duplicate["id"] = json!("PROP0001");
    let mut imported = draft("Imported", "Nevada", "Reno", 150_000.0);
    imported["id"] = json!("PROP0100");

    let response = client
        .post_json("/properties/import", Some(BOB), &json!([imported, bad, duplicate]))
        .await;
    response.assert_status(StatusCode::CREATED);

    let report: Value = response.json();
    assert_eq!(report["totalRecords"], 3);
    assert_eq!(report["successfulInserts"], 1);
    assert_eq!(report["failedInserts"], 2);
    assert_eq!(report["insertedProperties"][0]["id"], "PROP0100");

    let options = client.get("/properties/filter-options").await;
    options.assert_cache("MISS");
    let states = options.json::<Value>()["states"].clone();
    assert_eq!(states, json!(["California", "Nevada", "Texas"]));
}

#[tokio::test]
async fn empty_import_is_400() {
    client()
        .post_json("/properties/import", Some(ALICE), &json!([]))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
