//! Room geometry conversions.
//!
//! Pure functions with no failure modes of their own; inputs are validated
//! upstream by `sizing::validation`.

/// Room volume in m³ from its three dimensions.
pub fn volume_from_dimensions(length_m: f64, width_m: f64, height_m: f64) -> f64 {
    length_m * width_m * height_m
}

/// Floor area in m² for a volume under the given ceiling height.
pub fn area_from_volume(volume_m3: f64, ceiling_height_m: f64) -> f64 {
    volume_m3 / ceiling_height_m
}

/// Volume in m³ for a floor area under the given ceiling height.
pub fn volume_from_area(area_m2: f64, ceiling_height_m: f64) -> f64 {
    area_m2 * ceiling_height_m
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_volume_from_dimensions() {
        assert_relative_eq!(volume_from_dimensions(8.0, 5.0, 3.0), 120.0);
        assert_relative_eq!(volume_from_dimensions(20.0, 15.0, 4.0), 1200.0);
    }

    #[test]
    fn test_area_volume_inverse() {
        let area = area_from_volume(135.0, 2.7);
        assert_relative_eq!(area, 50.0, epsilon = 1e-9);
        assert_relative_eq!(volume_from_area(area, 2.7), 135.0, epsilon = 1e-9);
    }
}
