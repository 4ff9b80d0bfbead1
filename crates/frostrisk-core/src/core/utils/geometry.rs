const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two WGS84 points in kilometres (haversine).
#[inline]
pub fn great_circle_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Whether a coordinate pair is a usable WGS84 position.
#[inline]
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Index of the square grid cell containing a coordinate.
#[inline]
pub fn grid_cell(latitude: f64, longitude: f64, cell_size_deg: f64) -> (i64, i64) {
    (
        (latitude / cell_size_deg).floor() as i64,
        (longitude / cell_size_deg).floor() as i64,
    )
}

/// Centre point of a grid cell produced by [`grid_cell`].
#[inline]
pub fn grid_cell_center(cell: (i64, i64), cell_size_deg: f64) -> (f64, f64) {
    (
        (cell.0 as f64 + 0.5) * cell_size_deg,
        (cell.1 as f64 + 0.5) * cell_size_deg,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert!(great_circle_km(69.679, 18.940, 69.679, 18.940).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = great_circle_km(68.0, 20.0, 69.0, 20.0);
        assert!((d - 111.19).abs() < 0.1, "distance was {d}");
    }

    #[test]
    fn tromso_to_hammerfest_is_roughly_two_hundred_km() {
        let d = great_circle_km(69.679, 18.940, 70.680, 23.668);
        assert!(d > 180.0 && d < 230.0, "distance was {d}");
    }

    #[test]
    fn invalid_coordinates_are_rejected() {
        assert!(is_valid_coordinate(68.0, 17.0));
        assert!(!is_valid_coordinate(f64::NAN, 17.0));
        assert!(!is_valid_coordinate(91.0, 17.0));
        assert!(!is_valid_coordinate(68.0, 181.0));
    }

    #[test]
    fn grid_cell_center_lies_inside_its_cell() {
        let cell = grid_cell(68.43, 17.42, 0.1);
        let (lat, lon) = grid_cell_center(cell, 0.1);
        assert_eq!(grid_cell(lat, lon, 0.1), cell);
        assert!((lat - 68.45).abs() < 1e-9);
        assert!((lon - 17.45).abs() < 1e-9);
    }
}
