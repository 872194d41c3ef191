// Locale-independent number formatting for OBJ8 output.
//
// Values are rounded to 8 fractional digits, then trailing zeros and a
// dangling decimal point are trimmed. Negative zero prints as "0".

/// Fractional digits kept when writing floats.
pub const FLOAT_PRECISION: usize = 8;

/// Format a float the way OBJ8 files expect it.
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        log::warn!("Non-finite value {} written as 0", value);
        return "0".to_string();
    }

    let mut s = format!("{:.*}", FLOAT_PRECISION, value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }

    if s == "-0" {
        s = "0".to_string();
    }
    s
}
