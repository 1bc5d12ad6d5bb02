use crate::reading::{round_tenth, TemperatureUnit};

// Format a Celsius value in the display unit, one decimal
pub fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{:.1} {}", round_tenth(unit.from_celsius(celsius)), unit.symbol())
}

pub fn column_title(unit: TemperatureUnit) -> String {
    format!("Temperature ({})", unit.symbol())
}

/// Y-axis bounds covering every value with some headroom.
pub fn padded_bounds(values: &[f64], pad: f64) -> [f64; 2] {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [-pad, pad];
    }
    [min - pad, max + pad]
}
