//! Projection integration tests.
//!
//! Every shipped projection is exercised through the `Projection` trait
//! object, the way map code consumes them.

use tilekit::error::ProjectionError;
use tilekit::geo::{GeoPoint, GeoRect, PixelPoint};
use tilekit::projection::{distance_km, Projection, ProjectionKind, SwissProjection};

/// Points at the quarter marks of a projection's bounds.
fn sample_points(bounds: &GeoRect) -> Vec<GeoPoint> {
    let fractions = [0.25, 0.5, 0.75];
    let mut points = Vec::new();
    for fy in fractions {
        for fx in fractions {
            points.push(GeoPoint::new(
                bounds.bottom() + fy * (bounds.top() - bounds.bottom()),
                bounds.left() + fx * (bounds.right() - bounds.left()),
            ));
        }
    }
    points
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_round_trip_within_two_pixels_for_every_projection() {
    for kind in ProjectionKind::ALL {
        let projection = kind.build();

        for zoom in 0..=projection.max_zoom() {
            for point in sample_points(&projection.bounds()) {
                let pixel = projection.from_lat_lng_to_pixel_point(point, zoom);
                let back = projection
                    .from_pixel_to_lat_lng(pixel.x, pixel.y, zoom)
                    .unwrap_or_else(|e| {
                        panic!("{} inverse failed at zoom {}: {}", projection.name(), zoom, e)
                    });

                let error_m = distance_km(point, back) * 1000.0;
                let tolerance_m = 2.0 * projection.ground_resolution(zoom, point.lat) + 0.05;

                assert!(
                    error_m <= tolerance_m,
                    "{} zoom {} at {}: off by {:.3} m, allowed {:.3} m",
                    projection.name(),
                    zoom,
                    point,
                    error_m,
                    tolerance_m
                );
            }
        }
    }
}

#[test]
fn test_pixel_round_trip_is_stable() {
    // Projecting the inverse of a pixel lands back on a neighbouring pixel.
    for kind in ProjectionKind::ALL {
        let projection = kind.build();
        let zoom = projection.max_zoom() / 2;
        let center = projection.bounds().center();

        let pixel = projection.from_lat_lng_to_pixel_point(center, zoom);
        let back = projection
            .from_pixel_to_lat_lng(pixel.x, pixel.y, zoom)
            .unwrap();
        let again = projection.from_lat_lng_to_pixel_point(back, zoom);

        assert!(
            (again.x - pixel.x).abs() <= 1 && (again.y - pixel.y).abs() <= 1,
            "{}: {} became {}",
            projection.name(),
            pixel,
            again
        );
    }
}

// =============================================================================
// Tile Matrix
// =============================================================================

#[test]
fn test_tile_matrix_is_well_formed_at_every_zoom() {
    for kind in ProjectionKind::ALL {
        let projection = kind.build();
        let mut previous_count = 0;

        for zoom in 0..=projection.max_zoom() {
            let min = projection.tile_matrix_min_xy(zoom);
            let max = projection.tile_matrix_max_xy(zoom);

            assert!(min.x >= 0 && min.y >= 0, "{} zoom {}", projection.name(), zoom);
            assert!(
                min.x <= max.x && min.y <= max.y,
                "{} zoom {}: min {} max {}",
                projection.name(),
                zoom,
                min,
                max
            );

            let count = projection.tile_matrix_item_count(zoom);
            assert!(count >= 1);
            assert!(
                count >= previous_count,
                "{}: zoom {} has fewer tiles than zoom {}",
                projection.name(),
                zoom,
                zoom.saturating_sub(1)
            );
            previous_count = count;
        }
    }
}

#[test]
fn test_bounds_center_falls_inside_tile_matrix() {
    for kind in ProjectionKind::ALL {
        let projection = kind.build();

        for zoom in 0..=projection.max_zoom() {
            let pixel = projection.from_lat_lng_to_pixel_point(projection.bounds().center(), zoom);
            let tile = projection.from_pixel_to_tile_xy(pixel);
            let min = projection.tile_matrix_min_xy(zoom);
            let max = projection.tile_matrix_max_xy(zoom);

            assert!(
                tile.x >= min.x && tile.x <= max.x && tile.y >= min.y && tile.y <= max.y,
                "{} zoom {}: tile {} outside {}..{}",
                projection.name(),
                zoom,
                tile,
                min,
                max
            );
        }
    }
}

#[test]
fn test_zoom_above_max_is_clamped() {
    for kind in ProjectionKind::ALL {
        let projection = kind.build();
        let max_zoom = projection.max_zoom();
        let center = projection.bounds().center();

        assert_eq!(
            projection.from_lat_lng_to_pixel_point(center, max_zoom.saturating_add(3)),
            projection.from_lat_lng_to_pixel_point(center, max_zoom),
            "{}",
            projection.name()
        );
        assert_eq!(
            projection.tile_matrix_max_xy(u8::MAX),
            projection.tile_matrix_max_xy(max_zoom)
        );
    }
}

// =============================================================================
// Known Values
// =============================================================================

#[test]
fn test_mercator_origin_maps_to_world_center() {
    let mercator = ProjectionKind::Mercator.build();
    assert_eq!(
        mercator.from_lat_lng_to_pixel(0.0, 0.0, 0),
        PixelPoint::new(128, 128)
    );
    assert_eq!(
        mercator.from_pixel_to_tile_xy(PixelPoint::new(128, 128)),
        PixelPoint::new(0, 0)
    );
}

#[test]
fn test_mercator_and_elliptical_share_longitude_axis() {
    let spherical = ProjectionKind::Mercator.build();
    let elliptical = ProjectionKind::EllipticalMercator.build();

    let a = spherical.from_lat_lng_to_pixel(55.0, 24.0, 12);
    let b = elliptical.from_lat_lng_to_pixel(55.0, 24.0, 12);

    assert!((a.x - b.x).abs() <= 1);
    // The ellipsoid pulls high latitudes towards the equator
    assert!(b.y > a.y);
}

#[test]
fn test_swiss_grid_reference_point() {
    // Old Bern observatory, the grid's false origin
    let (easting, northing) = SwissProjection::to_grid(46.95108, 7.43864);
    assert!((easting - 600_000.0).abs() < 2.0);
    assert!((northing - 200_000.0).abs() < 2.0);
}

// =============================================================================
// Area Tile Lists
// =============================================================================

#[test]
fn test_area_tile_list_stays_inside_matrix() {
    for kind in ProjectionKind::ALL {
        let projection = kind.build();
        let bounds = projection.bounds();

        // Larger than the projection's coverage on every side
        let area = GeoRect::from_ltrb(
            bounds.left() - 1.0,
            bounds.top() + 1.0,
            bounds.right() + 1.0,
            bounds.bottom() - 1.0,
        );

        for zoom in 0..=projection.max_zoom().min(4) {
            let tiles = projection.area_tile_list(&area, zoom, 2);
            let min = projection.tile_matrix_min_xy(zoom);
            let max = projection.tile_matrix_max_xy(zoom);

            assert!(!tiles.is_empty(), "{} zoom {}", projection.name(), zoom);
            for tile in &tiles {
                assert!(
                    tile.x >= min.x && tile.x <= max.x && tile.y >= min.y && tile.y <= max.y,
                    "{} zoom {}: {} outside matrix",
                    projection.name(),
                    zoom,
                    tile
                );
            }
        }
    }
}

#[test]
fn test_area_tile_list_padding_grows_selection() {
    let mercator = ProjectionKind::Mercator.build();
    let vilnius = GeoRect::from_ltrb(25.2, 54.72, 25.32, 54.65);

    let tight = mercator.area_tile_list(&vilnius, 12, 0);
    let padded = mercator.area_tile_list(&vilnius, 12, 1);

    assert!(!tight.is_empty());
    assert!(padded.len() > tight.len());
    for tile in &tight {
        assert!(padded.contains(tile));
    }
}

// =============================================================================
// Failure Reporting
// =============================================================================

#[test]
fn test_non_convergent_inverse_is_an_error() {
    let result = SwissProjection::to_lat_lng(f64::NAN, f64::NAN);
    assert!(matches!(
        result,
        Err(ProjectionError::NoConvergence { iterations, .. }) if iterations > 0
    ));
}
