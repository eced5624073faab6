use findspot::api::{create_router, handlers::AppState};
use findspot::store::{FeatureStore, SpotDraft, StoreOptions};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;

async fn spawn_server(store: FeatureStore) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(AppState::new(Arc::new(store)));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn seeded() -> FeatureStore {
    let store = FeatureStore::in_memory();
    store
        .create(SpotDraft::point(12.636127, 43.727362).with_property("fee", "yes").with_property("name", "Centro"))
        .unwrap();
    store
        .create(SpotDraft::point(12.5, 43.5).with_property("fee", "no").with_property("surface", "asphalt"))
        .unwrap();
    store
}

fn point_feature(lon: f64, lat: f64) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [lon, lat] },
        "properties": { "name": "Nuovo", "fee": "no" }
    })
}

#[tokio::test]
async fn test_list_and_filter() {
    let base = spawn_server(seeded()).await;
    let client = reqwest::Client::new();

    let body: Value = client.get(format!("{base}/api/parcheggi")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["type"], "FeatureCollection");
    assert_eq!(body["features"].as_array().unwrap().len(), 2);
    assert!(body.get("message").is_none());

    let body: Value =
        client.get(format!("{base}/api/parcheggi?fee=YES")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["features"].as_array().unwrap().len(), 1);
    assert_eq!(body["features"][0]["id"], "12.636127_43.727362");

    let res = client.get(format!("{base}/api/parcheggi?fee=yes&surface=asphalt")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["features"].as_array().unwrap().is_empty());
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_invalid_filter_lists_keys() {
    let base = spawn_server(seeded()).await;
    let res = reqwest::get(format!("{base}/api/parcheggi?colour=red&fee=yes")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["invalid_keys"], json!(["colour"]));
    assert!(body["error"].as_str().unwrap().contains("colour"));
}

#[tokio::test]
async fn test_repeated_filter_key_is_rejected() {
    let base = spawn_server(seeded()).await;
    let res = reqwest::get(format!("{base}/api/parcheggi?fee=yes&fee=no")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("fee"));
}

#[tokio::test]
async fn test_create_then_duplicate() {
    let base = spawn_server(FeatureStore::in_memory()).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/parcheggi");

    let res = client.post(&url).json(&point_feature(12.636127, 43.727362)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], "12.636127_43.727362");

    let res = client.post(&url).json(&point_feature(12.6361269, 43.7273621)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["features"].as_array().unwrap().len(), 1);
    assert_eq!(body["features"][0]["properties"]["id"], "12.636127_43.727362");
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let base = spawn_server(FeatureStore::in_memory()).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/parcheggi");

    let bodies = [
        json!({ "type": "Feature", "properties": {} }),
        json!({ "type": "Feature", "geometry": { "type": "Point" } }),
        json!({ "type": "Feature", "geometry": { "type": "Point", "coordinates": [190.0, 0.0] } }),
        json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]] }
        }),
        json!([1, 2, 3]),
    ];
    for body in bodies {
        let res = client.post(&url).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
    }

    let res = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.post(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_whitelist_and_errors() {
    let base = spawn_server(seeded()).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/parcheggi/12.636127_43.727362");

    let res = client
        .put(&url)
        .json(&json!({ "name": "Piazza", "capacity": 30, "fee": "no", "note": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["updatedProperties"], json!({ "fee": "no", "name": "Piazza" }));

    let res = client.put(&url).json(&json!({ "capacity": 30 })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.put(&url).json(&json!({})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.put(&url).json(&json!({ "name": ["a"] })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(format!("{base}/api/parcheggi/0.000000_0.000000"))
        .json(&json!({ "name": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value =
        client.get(format!("{base}/api/parcheggi?name=piazza")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["features"][0]["properties"]["fee"], "no");
    assert!(body["features"][0]["properties"].get("capacity").is_none());
}

#[tokio::test]
async fn test_delete_is_final() {
    let base = spawn_server(seeded()).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/parcheggi/12.500000_43.500000");

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], "12.500000_43.500000");

    assert_eq!(client.delete(&url).send().await.unwrap().status(), StatusCode::NOT_FOUND);
    let res = client.put(&url).json(&json!({ "name": "x" })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_percent_encoded_osm_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parcheggi.geojson");
    std::fs::write(
        &path,
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "@id": "node/42", "amenity": "parking" },
                "geometry": { "type": "Point", "coordinates": [9.0, 45.0] }
            }]
        })
        .to_string(),
    )
    .unwrap();
    let base = spawn_server(FeatureStore::open(&path, StoreOptions::default()).unwrap()).await;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{base}/api/parcheggi/node%2F42"))
        .json(&json!({ "surface": "gravel" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["features"][0]["properties"]["surface"], "gravel");
}

#[tokio::test]
async fn test_keys_stats_health_and_fallback() {
    let base = spawn_server(seeded()).await;
    let client = reqwest::Client::new();

    let body: Value = client.get(format!("{base}/api/parcheggi/keys")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["keys"], json!(["fee", "id", "name", "surface"]));

    let body: Value = client
        .get(format!("{base}/api/parcheggi/stats?fields=fee,surface"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 2);
    assert_eq!(body["fields"][0]["field"], "fee");
    assert_eq!(body["fields"][0]["values"], json!([{ "value": "no", "count": 1 }, { "value": "yes", "count": 1 }]));
    assert_eq!(body["fields"][1]["values"], json!([{ "value": "asphalt", "count": 1 }]));

    let body: Value = client.get(format!("{base}/api/parcheggi/stats")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["fields"].as_array().unwrap().len(), 7);

    let body: Value = client.get(format!("{base}/health")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body, json!({ "ok": true, "features": 2 }));

    let res = client.get(format!("{base}/api/parking")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/api/parking");
    assert!(body["suggestion"].is_string());
}
