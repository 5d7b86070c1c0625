use citynav_core::locations::codec::{decode, encode};
use citynav_core::{AnnotatedPoint, Coordinate};
use uuid::Uuid;

fn point_with_id(id: &str, name: &str, lat: f64, lon: f64) -> AnnotatedPoint {
    AnnotatedPoint::with_id(
        Uuid::parse_str(id).unwrap(),
        name,
        "somewhere nice",
        "mappin",
        Coordinate::new(lat, lon).unwrap(),
    )
    .unwrap()
}

#[test]
fn round_trip_preserves_members_order_and_values() {
    let custom = vec![
        point_with_id(
            "00000000-0000-4000-8000-000000000001",
            "Home",
            22.0,
            114.0,
        ),
        point_with_id(
            "00000000-0000-4000-8000-000000000002",
            "Work",
            22.30493,
            114.17008,
        ),
        point_with_id(
            "00000000-0000-4000-8000-000000000003",
            "边界点",
            -90.0,
            180.0,
        ),
    ];

    let decoded = decode(&encode(&custom).unwrap()).unwrap();
    assert_eq!(decoded, custom);
}

#[test]
fn empty_list_round_trips() {
    let decoded = decode(&encode(&[]).unwrap()).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn decode_accepts_the_external_field_layout() {
    let payload = br#"[{
        "id": "00000000-0000-4000-8000-000000000009",
        "name": "Pier 7",
        "description": "Ferry pier",
        "iconRef": "ferry",
        "latitude": 22.28697,
        "longitude": 114.16055
    }]"#;

    let points = decode(payload).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].name, "Pier 7");
    assert_eq!(points[0].icon_ref, "ferry");
    assert!((points[0].coordinate.latitude - 22.28697).abs() < f64::EPSILON);
}
