use crate::error::CapacityError;

/// Decides how large a buffer becomes when it has to grow.
///
/// Implementations are pure. The returned size is always at least
/// `current + additional` and never more than `maximum`; when the requirement
/// itself does not fit under `maximum`, growing fails instead of clamping.
pub trait GrowthStrategy {
    /// # Errors
    ///
    /// [`CapacityError`] when `current + additional` exceeds `maximum` or
    /// overflows.
    fn next_size(
        &self,
        current: usize,
        additional: usize,
        maximum: usize,
    ) -> Result<usize, CapacityError>;
}

fn clamp(
    candidate: usize,
    current: usize,
    additional: usize,
    maximum: usize,
) -> Result<usize, CapacityError> {
    let required = current
        .checked_add(additional)
        .ok_or(CapacityError::SizeOverflow)?;
    if required > maximum {
        return Err(CapacityError::MaximumBufferSizeExceeded { required, maximum });
    }
    Ok(candidate.max(required).min(maximum))
}

/// Doubles the current size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoublingGrowth;

impl GrowthStrategy for DoublingGrowth {
    fn next_size(
        &self,
        current: usize,
        additional: usize,
        maximum: usize,
    ) -> Result<usize, CapacityError> {
        clamp(current.saturating_mul(2), current, additional, maximum)
    }
}

/// Multiplies the current size by a constant factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorGrowth {
    factor: f64,
}

impl FactorGrowth {
    pub const DEFAULT_FACTOR: f64 = 2.0;

    /// Factors that are not finite or not greater than one fall back to
    /// [`FactorGrowth::DEFAULT_FACTOR`].
    #[must_use]
    pub fn new(factor: f64) -> Self {
        let factor = if factor.is_finite() && factor > 1.0 {
            factor
        } else {
            Self::DEFAULT_FACTOR
        };
        Self { factor }
    }

    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Default for FactorGrowth {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FACTOR)
    }
}

impl GrowthStrategy for FactorGrowth {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn next_size(
        &self,
        current: usize,
        additional: usize,
        maximum: usize,
    ) -> Result<usize, CapacityError> {
        // Float-to-int casts saturate; the clamp below bounds the result.
        let exact = current as f64 * self.factor;
        let mut scaled = exact as usize;
        if (scaled as f64) < exact {
            scaled = scaled.saturating_add(1);
        }
        clamp(scaled, current, additional, maximum)
    }
}

/// The growth policy selected through configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Growth {
    #[default]
    Doubling,
    Factor(f64),
}

impl GrowthStrategy for Growth {
    fn next_size(
        &self,
        current: usize,
        additional: usize,
        maximum: usize,
    ) -> Result<usize, CapacityError> {
        match *self {
            Growth::Doubling => DoublingGrowth.next_size(current, additional, maximum),
            Growth::Factor(factor) => {
                FactorGrowth::new(factor).next_size(current, additional, maximum)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::doubles(100, 10, 1000, 200)]
    #[case::requirement_wins(100, 500, 1000, 600)]
    #[case::clamped_to_maximum(600, 10, 1000, 1000)]
    #[case::empty_buffer(0, 16, 1000, 16)]
    #[case::exactly_maximum(900, 100, 1000, 1000)]
    fn doubling(
        #[case] current: usize,
        #[case] additional: usize,
        #[case] maximum: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(
            DoublingGrowth.next_size(current, additional, maximum),
            Ok(expected)
        );
    }

    #[test]
    fn requirement_above_maximum_fails() {
        assert_eq!(
            DoublingGrowth.next_size(900, 101, 1000),
            Err(CapacityError::MaximumBufferSizeExceeded {
                required: 1001,
                maximum: 1000
            })
        );
        assert_eq!(
            DoublingGrowth.next_size(usize::MAX, 1, usize::MAX),
            Err(CapacityError::SizeOverflow)
        );
    }

    #[rstest]
    #[case(1.5, 100, 1, 150)]
    #[case(3.0, 100, 1, 300)]
    #[case(1.5, 100, 80, 180)]
    #[case(1.5, 700, 1, 1000)]
    fn factor_policy(
        #[case] factor: f64,
        #[case] current: usize,
        #[case] additional: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(
            FactorGrowth::new(factor).next_size(current, additional, 1000),
            Ok(expected)
        );
    }

    #[test]
    fn invalid_factor_falls_back_to_default() {
        assert_eq!(FactorGrowth::new(0.5).factor(), FactorGrowth::DEFAULT_FACTOR);
        assert_eq!(FactorGrowth::new(f64::NAN).factor(), FactorGrowth::DEFAULT_FACTOR);
        assert_eq!(
            Growth::Factor(f64::INFINITY).next_size(10, 1, 100),
            Growth::Doubling.next_size(10, 1, 100)
        );
    }
}
