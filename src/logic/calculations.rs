/// Temperature at or below which maturation stalls (°C)
pub const TEMP_FLOOR_C: f64 = 10.0;
/// Span above the floor over which the temperature factor ramps to 1 (°C)
pub const TEMP_RAMP_C: f64 = 15.0;
/// Most favourable daily precipitation (mm)
pub const OPTIMAL_PRECIP_MM: f64 = 5.0;
/// Distance from the optimum at which precipitation stops being favourable (mm)
pub const PRECIP_TOLERANCE_MM: f64 = 10.0;

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Temperature influence on development: 0 at or below 10°C, 1 at or above 25°C, linear between
pub fn temp_factor(temperature: f64) -> f64 {
    clamp_unit((temperature - TEMP_FLOOR_C) / TEMP_RAMP_C)
}

/// Precipitation favourability: 1 at the optimum, falling linearly to 0 at ±10mm
pub fn precip_factor(precipitation: f64) -> f64 {
    1.0 - clamp_unit((precipitation - OPTIMAL_PRECIP_MM).abs() / PRECIP_TOLERANCE_MM)
}

/// Combined daily development multiplier
pub fn development_factor(temperature: f64, precipitation: f64) -> f64 {
    temp_factor(temperature) * precip_factor(precipitation)
}

/// Area of the perimeter band sprayed on a square block.
///
/// A band deeper than half the side covers the whole block.
pub fn treated_area(side_length: f64, application_depth: f64) -> f64 {
    let inner_side = (side_length - 2.0 * application_depth).max(0.0);
    side_length.powi(2) - inner_side.powi(2)
}

/// Pest density per modeled unit area
pub fn pressure_density(count: f64, pressure_area: f64) -> f64 {
    count / pressure_area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_factor_known_values() {
        assert_eq!(temp_factor(-5.0), 0.0);
        assert_eq!(temp_factor(10.0), 0.0);
        assert!((temp_factor(17.5) - 0.5).abs() < 1e-12);
        assert_eq!(temp_factor(25.0), 1.0);
        assert_eq!(temp_factor(38.0), 1.0);
    }

    #[test]
    fn precip_factor_known_values() {
        assert_eq!(precip_factor(5.0), 1.0);
        assert!((precip_factor(0.0) - 0.5).abs() < 1e-12);
        assert!((precip_factor(10.0) - 0.5).abs() < 1e-12);
        assert_eq!(precip_factor(15.0), 0.0);
        assert_eq!(precip_factor(40.0), 0.0);
    }

    #[test]
    fn development_factor_is_product() {
        assert_eq!(development_factor(25.0, 5.0), 1.0);
        assert_eq!(development_factor(5.0, 5.0), 0.0);
        assert!((development_factor(17.5, 0.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn treated_area_perimeter_band() {
        // 100 x 100 block, 5 deep band: 10000 - 90^2
        assert!((treated_area(100.0, 5.0) - 1900.0).abs() < 1e-9);
        assert_eq!(treated_area(100.0, 0.0), 0.0);
        // Band covers everything
        assert_eq!(treated_area(10.0, 6.0), 100.0);
    }

    #[test]
    fn pressure_density_scales_by_area() {
        assert_eq!(pressure_density(90.0, 100.0), 0.9);
        assert_eq!(pressure_density(3.0, 1.0), 3.0);
    }
}
