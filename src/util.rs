/// Round up to one decimal place.
pub fn ceil_tenths(value: f64) -> f64 {
    (value * 10.0).ceil() / 10.0
}

/// Round to the nearest tenth.
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
