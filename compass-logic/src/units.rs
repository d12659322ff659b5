/// Meters to feet
pub const FEET_PER_METER: f64 = 3.2808;
/// Meters per second to miles per hour
pub const MPH_PER_MPS: f64 = 2.2369;

const UNKNOWN_READING: &str = "--";

/// Round half toward positive infinity, so `-2.5` becomes `-2` and `2.5` becomes `3`.
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    // Exact, unlike adding 0.5 first which rounds up values just below a half
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Format with one decimal place, exact ties round away from zero.
/// Only multiples of an odd quarter land exactly on a tie, everything else already formats to the
/// nearest digit.
fn fixed_one_decimal(value: f64) -> String {
    let quarters = value * 4.0;
    let is_tie = quarters.fract() == 0.0 && quarters % 2.0 != 0.0;
    if is_tie {
        let tenths = (value.abs() * 10.0).ceil().copysign(value);
        format!("{:.1}", tenths / 10.0)
    } else {
        format!("{value:.1}")
    }
}

/// Altitude in whole feet, [None] if the reading is missing or not finite
pub fn altitude_feet(meters: Option<f64>) -> Option<i64> {
    meters
        .filter(|m| m.is_finite())
        .map(|m| round_half_up(m * FEET_PER_METER) as i64)
}

/// Speed in miles per hour, [None] if the reading is missing or not finite
pub fn speed_mph(mps: Option<f64>) -> Option<f64> {
    mps.filter(|s| s.is_finite()).map(|s| s * MPH_PER_MPS)
}

/// Format an altitude for display, e.g. `328 Feet`
pub fn format_altitude(meters: Option<f64>) -> String {
    match altitude_feet(meters) {
        Some(feet) => format!("{feet} Feet"),
        None => format!("{UNKNOWN_READING} Feet"),
    }
}

/// Format a speed for display with one decimal place, e.g. `22.4 mph`
pub fn format_speed(mps: Option<f64>) -> String {
    match speed_mph(mps) {
        Some(mph) => format!("{} mph", fixed_one_decimal(mph)),
        None => format!("{UNKNOWN_READING} mph"),
    }
}
