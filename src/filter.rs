// Numan Thabit 2026
// filter.rs - exponential feedback filters

/// Exponential weighted moving average. The caller owns the running value
/// `prev`; `alpha` weighs the new sample.
pub fn ewma(prev: f64, sample: f64, alpha: f64) -> f64 {
    sample * alpha + (1.0 - alpha) * prev
}

/// Exponential weighted moving maximum. Jumps to any sample at or above the
/// running value, otherwise decays geometrically toward zero. This is a
/// decaying envelope of the recent maximum, not a windowed maximum.
pub fn ewmm(prev: f64, sample: f64, alpha: f64) -> f64 {
    if sample >= prev {
        sample
    } else {
        (1.0 - alpha) * prev
    }
}

/// Linear-decay variant of [`ewmm`]. Here `step` is an absolute per-call
/// decrement in the same unit as `sample`, not a fraction; the running value
/// never decays below zero.
pub fn ewmm2(prev: f64, sample: f64, step: f64) -> f64 {
    if sample >= prev {
        sample
    } else {
        (prev - step).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ewma_endpoints() {
        assert_eq!(ewma(7.0, 3.0, 0.0), 7.0);
        assert_eq!(ewma(7.0, 3.0, 1.0), 3.0);
    }

    #[test]
    fn ewma_blends() {
        // 0.5 * 10 + 0.5 * 20
        assert!((ewma(10.0, 20.0, 0.5) - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ewmm_follows_new_maximum() {
        assert_eq!(ewmm(4.0, 9.0, 0.1), 9.0);
        assert_eq!(ewmm(4.0, 4.0, 0.1), 4.0);
    }

    #[test]
    fn ewmm_decays_below_maximum() {
        let next = ewmm(10.0, 2.0, 0.1);
        assert!((next - 9.0).abs() < f64::EPSILON);
        assert!(next < 10.0);
    }

    #[test]
    fn ewmm2_decrements_by_absolute_step() {
        assert_eq!(ewmm2(10.0, 2.0, 0.5), 9.5);
        assert_eq!(ewmm2(10.0, 12.0, 0.5), 12.0);
    }

    #[test]
    fn ewmm2_saturates_at_zero() {
        assert_eq!(ewmm2(0.3, 0.0, 0.5), 0.0);
    }
}
