//! Number formatting for annotation labels.

/// U+2212, easier to spot than a hyphen in small text.
pub const MINUS_SIGN: char = '\u{2212}';

/// Round to `digits` decimals and print the shortest representation of the
/// result: `3.0`, `1.41`, `0.00012`, `1e-05`.
pub fn round_repr(v: f64, digits: usize) -> String {
    if !v.is_finite() {
        return float_repr(v);
    }
    let rounded: f64 = format!("{v:.digits$}").parse().unwrap_or(v);
    float_repr(rounded)
}

/// Shortest round-trip text of a float, always with a decimal point or an
/// exponent, switching to exponent form outside `[1e-4, 1e16)`.
pub fn float_repr(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0.0".into() } else { "0.0".into() };
    }
    let a = v.abs();
    if !(1e-4..1e16).contains(&a) {
        let s = format!("{v:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) => {
                let e: i32 = exp.parse().unwrap_or(0);
                let sign = if e < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", e.abs())
            }
            None => s,
        };
    }
    let s = format!("{v}");
    if s.contains('.') { s } else { format!("{s}.0") }
}

/// Replace ASCII hyphens with the typographic minus sign.
pub fn with_minus_sign(s: &str) -> String {
    s.replace('-', &MINUS_SIGN.to_string())
}
