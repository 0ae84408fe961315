use thiserror::Error;

/// Input validation errors, raised before any mining work begins.
///
/// Degenerate inputs (an empty corpus, no frequent 1-itemsets, a level with
/// no surviving candidates) are not errors; they terminate mining early with
/// an empty or partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("`min_support` must be a number between 0 and 1, got {0}")]
    MinSupportOutOfRange(f64),

    #[error("`min_confidence` must be a number between 0 and 1, got {0}")]
    MinConfidenceOutOfRange(f64),

    #[error("`max_length` must be at least 1")]
    MaxLengthZero,
}

pub(crate) fn validate_min_support(min_support: f64) -> Result<(), Error> {
    if min_support.is_finite() && (0.0..=1.0).contains(&min_support) {
        Ok(())
    } else {
        Err(Error::MinSupportOutOfRange(min_support))
    }
}

pub(crate) fn validate_min_confidence(min_confidence: f64) -> Result<(), Error> {
    if min_confidence.is_finite() && (0.0..=1.0).contains(&min_confidence) {
        Ok(())
    } else {
        Err(Error::MinConfidenceOutOfRange(min_confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_fractions_are_rejected() {
        assert_eq!(
            validate_min_support(1.5),
            Err(Error::MinSupportOutOfRange(1.5))
        );
        assert_eq!(
            validate_min_support(-0.1),
            Err(Error::MinSupportOutOfRange(-0.1))
        );
        assert!(validate_min_support(f64::NAN).is_err());
        assert!(validate_min_confidence(f64::INFINITY).is_err());
    }

    #[test]
    fn boundary_fractions_are_accepted() {
        assert_eq!(validate_min_support(0.0), Ok(()));
        assert_eq!(validate_min_support(1.0), Ok(()));
        assert_eq!(validate_min_confidence(0.0), Ok(()));
        assert_eq!(validate_min_confidence(1.0), Ok(()));
    }
}
