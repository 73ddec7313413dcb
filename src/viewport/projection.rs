//! Spherical-Mercator projection math.
//!
//! All pixel arithmetic uses the standard 256-pixel tile pyramid: at a
//! continuous zoom `z` the world is `256 · 2^z` pixels wide. The render
//! backend's world space is the same Mercator square expressed in
//! 31-bit fixed point, so one coordinate system converts to the other
//! by rescaling.

use glam::{DVec2, IVec2};

use super::GeoPoint;

/// Width and height of one map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude clamp of the Web-Mercator projection, in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// The backend world square spans `[0, 2^31)` on each axis.
const WORLD_31: f64 = 2_147_483_648.0;

/// Project a coordinate onto the unit Mercator square `[0, 1]²`.
///
/// X grows eastward from the antimeridian, Y grows southward from the
/// north clamp latitude. Latitude outside the representable range is
/// clamped first.
#[must_use]
pub fn normalized(geo: GeoPoint) -> DVec2 {
    let lat = geo.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin_lat = lat.to_radians().sin();

    let x = (geo.lon + 180.0) / 360.0;
    let y = 0.5
        - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln()
            / (4.0 * std::f64::consts::PI);
    DVec2::new(x, y)
}

/// Inverse of [`normalized`]: unit-square position back to lat/lon.
#[must_use]
pub fn denormalized(point: DVec2) -> GeoPoint {
    let lon = point.x * 360.0 - 180.0;
    let lat = (2.0
        * ((0.5 - point.y) * 2.0 * std::f64::consts::PI).exp().atan()
        - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    GeoPoint::new(lat, lon)
}

/// Absolute world-pixel position of a coordinate at a continuous zoom.
#[must_use]
pub fn world_pixels(geo: GeoPoint, zoom: f64) -> DVec2 {
    normalized(geo) * TILE_SIZE * zoom.exp2()
}

/// Inverse of [`world_pixels`].
#[must_use]
pub fn geo_from_world_pixels(pixels: DVec2, zoom: f64) -> GeoPoint {
    denormalized(pixels / (TILE_SIZE * zoom.exp2()))
}

/// Convert a coordinate into the backend's 31-bit fixed-point world.
#[must_use]
pub fn world31_from_geo(geo: GeoPoint) -> IVec2 {
    let n = normalized(geo);
    IVec2::new(fixed31(n.x), fixed31(n.y))
}

/// Convert a backend fixed-point world position back to lat/lon.
#[must_use]
pub fn geo_from_world31(world: IVec2) -> GeoPoint {
    denormalized(DVec2::new(
        f64::from(world.x) / WORLD_31,
        f64::from(world.y) / WORLD_31,
    ))
}

/// Rotate a vector counter-clockwise by `degrees`.
#[must_use]
pub fn rotate_vec(v: DVec2, degrees: f64) -> DVec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    DVec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

fn fixed31(unit: f64) -> i32 {
    let scaled = (unit.clamp(0.0, 1.0) * WORLD_31) as i64;
    scaled.min(i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_center() {
        // (0, 0) at zoom 0 sits in the middle of the single 256px tile
        let px = world_pixels(GeoPoint::new(0.0, 0.0), 0.0);
        assert!((px.x - 128.0).abs() < 0.1, "x = {}", px.x);
        assert!((px.y - 128.0).abs() < 0.1, "y = {}", px.y);
    }

    #[test]
    fn test_pixel_round_trip() {
        let geo = GeoPoint::new(37.7749, -122.4194);
        for zoom in [0.0, 5.0, 10.5, 18.0] {
            let px = world_pixels(geo, zoom);
            let back = geo_from_world_pixels(px, zoom);
            assert!(
                (back.lat - geo.lat).abs() < 1e-6,
                "lat round-trip at z{zoom}: {} vs {}",
                back.lat,
                geo.lat
            );
            assert!(
                (back.lon - geo.lon).abs() < 1e-6,
                "lon round-trip at z{zoom}: {} vs {}",
                back.lon,
                geo.lon
            );
        }
    }

    #[test]
    fn test_latitude_clamped() {
        let projected = normalized(GeoPoint::new(90.0, 0.0));
        let back = denormalized(projected);
        assert!(
            (back.lat - MAX_LATITUDE).abs() < 1e-4,
            "latitude not clamped: {}",
            back.lat
        );
    }

    #[test]
    fn test_zoom_doubles_pixels() {
        let geo = GeoPoint::new(20.0, 30.0);
        let a = world_pixels(geo, 4.0);
        let b = world_pixels(geo, 5.0);
        assert!((b.x / a.x - 2.0).abs() < 1e-9);
        assert!((b.y / a.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_world31_round_trip() {
        let geo = GeoPoint::new(52.52, 13.405);
        let world = world31_from_geo(geo);
        let back = geo_from_world31(world);
        assert!((back.lat - geo.lat).abs() < 1e-4);
        assert!((back.lon - geo.lon).abs() < 1e-4);
    }

    #[test]
    fn test_world31_center_and_bounds() {
        let center = world31_from_geo(GeoPoint::new(0.0, 0.0));
        assert_eq!(center.x, 1 << 30);
        assert_eq!(center.y, 1 << 30);

        // The east edge saturates instead of wrapping to a negative value
        let east = world31_from_geo(GeoPoint::new(0.0, 180.0));
        assert_eq!(east.x, i32::MAX);
    }

    #[test]
    fn test_rotate_vec() {
        let v = rotate_vec(DVec2::new(1.0, 0.0), 90.0);
        assert!(v.x.abs() < 1e-9);
        assert!((v.y - 1.0).abs() < 1e-9);
    }
}
