use geojson::{FeatureCollection, GeoJson, Geometry, PolygonType, Position, Value};

/// Reorients polygon rings in place: outer rings wind clockwise when
/// `outer_clockwise` is set, holes wind the other way. Anything that is not a
/// Polygon or MultiPolygon is left untouched.
pub fn rewind(geojson: &mut GeoJson, outer_clockwise: bool) {
    match geojson {
        GeoJson::FeatureCollection(collection) => rewind_collection(collection, outer_clockwise),
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry.as_mut() {
                rewind_geometry(geometry, outer_clockwise);
            }
        }
        GeoJson::Geometry(geometry) => rewind_geometry(geometry, outer_clockwise),
    }
}

pub fn rewind_collection(collection: &mut FeatureCollection, outer_clockwise: bool) {
    for feature in collection.features.iter_mut() {
        if let Some(geometry) = feature.geometry.as_mut() {
            rewind_geometry(geometry, outer_clockwise);
        }
    }
}

pub fn rewind_geometry(geometry: &mut Geometry, outer_clockwise: bool) {
    match &mut geometry.value {
        Value::GeometryCollection(geometries) => {
            for geometry in geometries.iter_mut() {
                rewind_geometry(geometry, outer_clockwise);
            }
        }
        Value::Polygon(rings) => rewind_rings(rings, outer_clockwise),
        Value::MultiPolygon(polygons) => {
            for rings in polygons.iter_mut() {
                rewind_rings(rings, outer_clockwise);
            }
        }
        _ => (),
    }
}

fn rewind_rings(rings: &mut PolygonType, outer_clockwise: bool) {
    let Some((outer, holes)) = rings.split_first_mut() else {
        return;
    };
    rewind_ring(outer, outer_clockwise);
    for hole in holes {
        rewind_ring(hole, !outer_clockwise);
    }
}

/// A ring with a zero sum has no orientation and is left as is.
fn rewind_ring(ring: &mut [Position], clockwise: bool) {
    let sum = winding_sum(ring);
    if sum != 0.0 && (sum > 0.0) != clockwise {
        ring.reverse();
    }
}

/// Shoelace sum over consecutive vertex pairs, positive for clockwise rings.
/// Accumulated with a running compensation term so that long rings keep the
/// right sign.
pub fn winding_sum(ring: &[Position]) -> f64 {
    let Some(mut prev) = ring.last() else {
        return 0.0;
    };
    let mut area = 0.0_f64;
    let mut err = 0.0_f64;
    for current in ring {
        let k = (current[0] - prev[0]) * (prev[1] + current[1]);
        let m = area + k;
        err += if area.abs() >= k.abs() { area - m + k } else { k - m + area };
        area = m;
        prev = current;
    }
    area + err
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Feature;

    fn ring(points: &[[f64; 2]]) -> Vec<Position> {
        points.iter().map(|p| p.to_vec()).collect()
    }

    fn clockwise_square() -> Vec<Position> {
        ring(&[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]])
    }

    fn counter_clockwise_square() -> Vec<Position> {
        let mut square = clockwise_square();
        square.reverse();
        square
    }

    fn polygon(rings: Vec<Vec<Position>>) -> Geometry {
        Geometry::new(Value::Polygon(rings))
    }

    fn rings_of(geometry: &Geometry) -> &PolygonType {
        match &geometry.value {
            Value::Polygon(rings) => rings,
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn winding_sum_sign_follows_orientation() {
        assert!(winding_sum(&clockwise_square()) > 0.0);
        assert!(winding_sum(&counter_clockwise_square()) < 0.0);
        assert_eq!(winding_sum(&[]), 0.0);
    }

    #[test]
    fn outer_ring_is_made_clockwise_and_holes_counter_clockwise() {
        let hole = ring(&[[0.25, 0.25], [0.25, 0.75], [0.75, 0.75], [0.75, 0.25], [0.25, 0.25]]);
        let mut geometry = polygon(vec![counter_clockwise_square(), hole]);

        rewind_geometry(&mut geometry, true);

        let rings = rings_of(&geometry);
        assert_eq!(rings[0], clockwise_square());
        assert!(winding_sum(&rings[0]) >= 0.0);
        assert!(winding_sum(&rings[1]) < 0.0);
    }

    #[test]
    fn counter_clockwise_outer_when_requested() {
        let mut geometry = polygon(vec![clockwise_square()]);
        rewind_geometry(&mut geometry, false);
        assert_eq!(rings_of(&geometry)[0], counter_clockwise_square());
    }

    #[test]
    fn rewind_is_idempotent() {
        let mut once = polygon(vec![counter_clockwise_square(), clockwise_square()]);
        rewind_geometry(&mut once, true);
        let mut twice = once.clone();
        rewind_geometry(&mut twice, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn zero_area_rings_are_stable() {
        let flat = ring(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [0.0, 0.0]]);
        assert_eq!(winding_sum(&flat), 0.0);

        let mut outer = polygon(vec![flat.clone()]);
        rewind_geometry(&mut outer, false);
        assert_eq!(rings_of(&outer)[0], flat);
        rewind_geometry(&mut outer, false);
        assert_eq!(rings_of(&outer)[0], flat);

        let mut with_hole = polygon(vec![counter_clockwise_square(), flat.clone()]);
        rewind_geometry(&mut with_hole, true);
        let once = with_hole.clone();
        rewind_geometry(&mut with_hole, true);
        assert_eq!(with_hole, once);
        assert_eq!(rings_of(&with_hole)[1], flat);
    }

    #[test]
    fn walks_collections_and_multipolygons() {
        let multi = Geometry::new(Value::MultiPolygon(vec![
            vec![counter_clockwise_square()],
            vec![counter_clockwise_square()],
        ]));
        let collection = Geometry::new(Value::GeometryCollection(vec![multi]));
        let mut geojson = GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features: vec![Feature {
                bbox: None,
                geometry: Some(collection),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            foreign_members: None,
        });

        rewind(&mut geojson, true);

        let GeoJson::FeatureCollection(collection) = geojson else {
            panic!("expected a feature collection");
        };
        let Some(Geometry { value: Value::GeometryCollection(geometries), .. }) = &collection.features[0].geometry else {
            panic!("expected a geometry collection");
        };
        let Value::MultiPolygon(polygons) = &geometries[0].value else {
            panic!("expected a multipolygon");
        };
        for rings in polygons {
            assert_eq!(rings[0], clockwise_square());
        }
    }

    #[test]
    fn line_strings_are_untouched() {
        let line = counter_clockwise_square();
        let mut geometry = Geometry::new(Value::LineString(line.clone()));
        rewind_geometry(&mut geometry, true);
        assert_eq!(geometry.value, Value::LineString(line));
    }

    #[test]
    fn large_ring_keeps_its_sign() {
        let steps = 10_000;
        let mut points: Vec<Position> = (0..steps)
            .map(|i| {
                let angle = -(i as f64) / steps as f64 * std::f64::consts::TAU;
                vec![179.0 + 1e-4 * angle.cos(), 45.0 + 1e-4 * angle.sin()]
            })
            .collect();
        points.push(points[0].clone());

        assert!(winding_sum(&points) > 0.0);
    }
}
