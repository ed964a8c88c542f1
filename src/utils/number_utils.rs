/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_round_to() {
        assert_abs_diff_eq!(round_to(1.666666, 4), 1.6667, epsilon = 1e-12);
        assert_abs_diff_eq!(round_to(2.0, 4), 2.0);
        assert_abs_diff_eq!(round_to(141.42135, 2), 141.42, epsilon = 1e-12);
        assert_abs_diff_eq!(round_to(-3.14159, 2), -3.14, epsilon = 1e-12);
    }
}
