use chrono::NaiveDateTime;

use crate::constants::TIMESTAMP_FORMAT;

/// One temperature sample. Values are stored in Celsius.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    value: f64,
    timestamp: String,
}

impl Reading {
    pub fn new(celsius: f64, at: NaiveDateTime) -> Self {
        Self {
            value: round_tenth(celsius),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn celsius(&self) -> f64 {
        self.value
    }

    pub fn value_in(&self, unit: TemperatureUnit) -> f64 {
        unit.from_celsius(self.value)
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// `HH:MM:SS` part of the timestamp, used for chart labels.
    pub fn time_of_day(&self) -> &str {
        self.timestamp.split(' ').nth(1).unwrap_or(&self.timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    #[cfg(test)]
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn reading_rounds_value_and_formats_timestamp() {
        let r = Reading::new(-17.2649, at(9, 5, 3));
        assert_eq!(r.celsius(), -17.3);
        assert_eq!(r.timestamp(), "2024-07-01 09:05:03");
        assert_eq!(r.time_of_day(), "09:05:03");
    }

    #[test]
    fn fahrenheit_conversion_known_points() {
        let f = TemperatureUnit::Fahrenheit;
        assert!((f.from_celsius(0.0) - 32.0).abs() < 1e-9);
        assert!((f.from_celsius(100.0) - 212.0).abs() < 1e-9);
        assert!((f.from_celsius(-40.0) + 40.0).abs() < 1e-9);
    }

    #[test]
    fn celsius_fahrenheit_round_trip() {
        let f = TemperatureUnit::Fahrenheit;
        for c in [-19.0, -17.3, -16.0, 0.0, 36.6] {
            let back = f.to_celsius(f.from_celsius(c));
            assert!((back - c).abs() < 1e-9, "{c} came back as {back}");
        }
    }

    #[test]
    fn toggle_flips_unit() {
        assert_eq!(TemperatureUnit::Celsius.toggled(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::Fahrenheit.toggled(), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::default().symbol(), "°C");
    }
}
