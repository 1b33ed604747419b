/// Rounds a monetary value to cents. A machine epsilon is added before
/// scaling so values like 2.675, stored as 2.67499999..., land on 2.68.
/// Halves round toward positive infinity.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scaled = (value + f64::EPSILON) * 100.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded / 100.0
}

pub fn format_amount(value: f64) -> String {
    format!("${:.2}", value)
}
