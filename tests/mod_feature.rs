use findspot::feature::{Feature, FeatureCollection, Geometry, Position};
use findspot::StoreError;
use serde_json::json;

fn osm_export() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "generator": "overpass-turbo",
        "features": [
            {
                "type": "Feature",
                "properties": { "@id": "way/4471", "amenity": "parking", "fee": "no" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [12.63, 43.72], [12.64, 43.72], [12.64, 43.73], [12.63, 43.72]
                    ]]
                }
            },
            {
                "type": "Feature",
                "id": 9001,
                "properties": { "amenity": "parking", "fee": "yes" },
                "geometry": { "type": "Point", "coordinates": [12.5, 43.5, 210.0] }
            },
            {
                "type": "Feature",
                "properties": null,
                "geometry": { "type": "Point", "coordinates": [-0.00000001, 45.25] }
            }
        ]
    })
}

#[test]
fn test_settle_assigns_and_mirrors_ids() {
    let mut collection: FeatureCollection = serde_json::from_value(osm_export()).unwrap();
    collection.settle().unwrap();

    let ids: Vec<&str> = collection.features.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["way/4471", "9001", "-0.000000_45.250000"]);
    for f in &collection.features {
        assert_eq!(f.properties["id"], json!(f.id));
    }
    assert_eq!(collection.features[0].properties["@id"], json!("way/4471"));
}

#[test]
fn test_foreign_members_are_kept() {
    let mut collection: FeatureCollection = serde_json::from_value(osm_export()).unwrap();
    collection.settle().unwrap();
    let out = serde_json::to_value(&collection).unwrap();
    assert_eq!(out["generator"], "overpass-turbo");
    assert_eq!(out["type"], "FeatureCollection");
    assert_eq!(out["features"][0]["geometry"]["type"], "Polygon");
    // altitude is dropped on re-serialization
    assert_eq!(out["features"][1]["geometry"]["coordinates"], json!([12.5, 43.5]));
}

#[test]
fn test_duplicate_ids_are_corrupt() {
    let doc = json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1.0, 2.0] }, "properties": {} },
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1.0000001, 2.0] }, "properties": {} }
        ]
    });
    let mut collection: FeatureCollection = serde_json::from_value(doc).unwrap();
    assert!(matches!(collection.settle(), Err(StoreError::Corrupt(_))));
}

#[test]
fn test_out_of_range_geometry_is_corrupt() {
    let doc = json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [181.0, 2.0] }, "properties": {} }
        ]
    });
    let mut collection: FeatureCollection = serde_json::from_value(doc).unwrap();
    match collection.settle() {
        Err(StoreError::Corrupt(msg)) => assert!(msg.contains("longitude"), "{msg}"),
        other => panic!("expected Corrupt, got {other:?}"),
    }
}

#[test]
fn test_unknown_geometry_type_fails_to_parse() {
    let doc = json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "geometry": { "type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]] } }
        ]
    });
    assert!(serde_json::from_value::<FeatureCollection>(doc).is_err());
}

#[test]
fn test_wrong_document_type_fails_to_parse() {
    let doc = json!({ "type": "Feature", "features": [] });
    assert!(serde_json::from_value::<FeatureCollection>(doc).is_err());
}

#[test]
fn test_position_bounds() {
    assert!(Position::new(180.0, -90.0).validate().is_ok());
    assert!(Position::new(-180.1, 0.0).validate().is_err());
    assert!(Position::new(0.0, 90.5).validate().is_err());
    assert!(Position::new(f64::NAN, 0.0).validate().is_err());
    assert!(serde_json::from_value::<Position>(json!([1.0])).is_err());
}

#[test]
fn test_geometry_helpers() {
    let point = Geometry::point(12.636127, 43.727362);
    assert_eq!(point.kind(), "Point");
    assert_eq!(point.anchor().unwrap().spot_id(), "12.636127_43.727362");

    let feature = Feature::new(point, serde_json::Map::new());
    assert!(feature.id.is_empty());
    assert_eq!(feature.property_text("name"), None);
}
