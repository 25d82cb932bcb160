use intel_core::geo::{distance_to, haversine_km, BoundingBox, EARTH_RADIUS_KM};
use intel_core::model::{Observer, OrbitalPosition};

const POINTS: [(f64, f64); 6] = [
    (0.0, 0.0),
    (51.5, -0.1),
    (29.4953, -95.1547),
    (-33.86, 151.2),
    (89.9, 45.0),
    (-60.0, -179.5),
];

#[test]
fn distance_to_self_is_zero() {
    for p in POINTS {
        assert!(haversine_km(p, p).abs() < 1e-9, "{p:?}");
    }
}

#[test]
fn distance_is_symmetric() {
    for a in POINTS {
        for b in POINTS {
            let ab = haversine_km(a, b);
            let ba = haversine_km(b, a);
            assert!((ab - ba).abs() < 1e-6, "{a:?} <-> {b:?}");
        }
    }
}

#[test]
fn antipode_is_half_circumference() {
    let half = std::f64::consts::PI * EARTH_RADIUS_KM;
    assert!((half - 20015.0).abs() < 1.0);
    for (lat, lon) in POINTS {
        let anti_lon = if lon > 0.0 { lon - 180.0 } else { lon + 180.0 };
        let d = haversine_km((lat, lon), (-lat, anti_lon));
        assert!((d - half).abs() < 1.0, "({lat}, {lon}) -> {d}");
    }
}

#[test]
fn london_to_observer_is_plausible() {
    let d = distance_to(
        &Observer::default(),
        &OrbitalPosition {
            latitude: 51.5,
            longitude: -0.1,
            timestamp: 0,
        },
    );
    assert!(d > 7000.0 && d < 8500.0, "{d}");
}

#[test]
fn bounding_box_is_symmetric_around_point() {
    let b = BoundingBox::around(29.5, -95.15, 1.5);
    assert_eq!(b.lamin, 28.0);
    assert_eq!(b.lamax, 31.0);
    assert!((b.lomin - -96.65).abs() < 1e-9);
    assert!((b.lomax - -93.65).abs() < 1e-9);
}
