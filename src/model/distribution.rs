//! Firing-time distributions. The variant set is closed: {Dirac,
//! Exponential, Erlang, Uniform, Weibull}. A capability tag lets the potato
//! numerics dispatch (`compute_potato_numerics`) reject unsupported families
//! statically at the call site rather than via a generic runtime panic.

use crate::error::ReductionError;
use crate::Arbitrary;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distribution {
    Dirac { d: f64 },
    Exponential { rate: f64 },
    Erlang { k: u32, rate: f64 },
    Uniform { a: f64, b: f64 },
    Weibull { scale: f64, shape: f64 },
}

/// Whether a distribution can be the alarm of a potato.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotatoCapability {
    /// A genuine alarm: Dirac, Erlang, or Uniform.
    Supported,
    /// Exponential events are ordinary CTMC transitions, never a potato.
    InvalidAlarm,
    /// Weibull is not implemented by the reduction path.
    Unsupported,
}

impl Distribution {
    pub fn family(&self) -> &'static str {
        match self {
            Self::Dirac { .. } => "Dirac",
            Self::Exponential { .. } => "Exponential",
            Self::Erlang { .. } => "Erlang",
            Self::Uniform { .. } => "Uniform",
            Self::Weibull { .. } => "Weibull",
        }
    }

    pub fn capability(&self) -> PotatoCapability {
        match self {
            Self::Dirac { .. } | Self::Erlang { .. } | Self::Uniform { .. } => {
                PotatoCapability::Supported
            }
            Self::Exponential { .. } => PotatoCapability::InvalidAlarm,
            Self::Weibull { .. } => PotatoCapability::Unsupported,
        }
    }

    /// Validates distribution parameters per §3's invariants.
    pub fn validate(&self) -> Result<(), ReductionError> {
        let invalid = |reason: &str| ReductionError::InvalidModel {
            reason: reason.to_string(),
        };
        match *self {
            Self::Dirac { d } => {
                if !(d >= 0.0) {
                    return Err(invalid("Dirac requires d >= 0"));
                }
            }
            Self::Exponential { rate } => {
                if !(rate > 0.0) {
                    return Err(invalid("Exponential requires rate > 0"));
                }
            }
            Self::Erlang { k, rate } => {
                if k < 1 {
                    return Err(invalid("Erlang requires shape k >= 1"));
                }
                if !(rate > 0.0) {
                    return Err(invalid("Erlang requires rate > 0"));
                }
            }
            Self::Uniform { a, b } => {
                if !(a >= 0.0 && a < b) {
                    return Err(invalid("Uniform requires 0 <= a < b"));
                }
            }
            Self::Weibull { scale, shape } => {
                if !(scale > 0.0 && shape > 0.0) {
                    return Err(invalid("Weibull requires scale > 0 and shape > 0"));
                }
            }
        }
        Ok(())
    }

    /// Expected firing time of the distribution, used as a sanity check and
    /// by κ-derivation's degenerate fallbacks.
    pub fn mean(&self) -> f64 {
        match *self {
            Self::Dirac { d } => d,
            Self::Exponential { rate } => 1.0 / rate,
            Self::Erlang { k, rate } => k as f64 / rate,
            Self::Uniform { a, b } => (a + b) / 2.0,
            Self::Weibull { scale, shape } => {
                scale * gamma(1.0 + 1.0 / shape)
            }
        }
    }
}

/// Lanczos approximation to the gamma function, only needed for Weibull's
/// mean (used in validation / diagnostics; Weibull is otherwise rejected by
/// the reduction path per `PotatoCapability::Unsupported`).
fn gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut a = COEFFS[0];
        let t = x + G + 0.5;
        for (i, c) in COEFFS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * a
    }
}

impl Arbitrary for Distribution {
    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        match rng.random_range(0..4) {
            0 => Self::Dirac {
                d: rng.random_range(0.1..10.0),
            },
            1 => Self::Exponential {
                rate: rng.random_range(0.1..5.0),
            },
            2 => Self::Erlang {
                k: rng.random_range(1..5),
                rate: rng.random_range(0.1..5.0),
            },
            _ => {
                let a = rng.random_range(0.0..5.0);
                Self::Uniform {
                    a,
                    b: a + rng.random_range(0.1..5.0),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_is_invalid_alarm() {
        let d = Distribution::Exponential { rate: 1.0 };
        assert_eq!(d.capability(), PotatoCapability::InvalidAlarm);
    }

    #[test]
    fn weibull_is_unsupported() {
        let d = Distribution::Weibull {
            scale: 1.0,
            shape: 0.5,
        };
        assert_eq!(d.capability(), PotatoCapability::Unsupported);
    }

    #[test]
    fn dirac_erlang_uniform_are_supported_alarms() {
        for d in [
            Distribution::Dirac { d: 1.0 },
            Distribution::Erlang { k: 2, rate: 1.0 },
            Distribution::Uniform { a: 0.0, b: 1.0 },
        ] {
            assert_eq!(d.capability(), PotatoCapability::Supported);
        }
    }

    #[test]
    fn rejects_malformed_parameters() {
        assert!(Distribution::Dirac { d: -1.0 }.validate().is_err());
        assert!(Distribution::Exponential { rate: 0.0 }.validate().is_err());
        assert!(Distribution::Erlang { k: 0, rate: 1.0 }.validate().is_err());
        assert!(Distribution::Uniform { a: 1.0, b: 0.5 }.validate().is_err());
        assert!(Distribution::Weibull {
            scale: -1.0,
            shape: 1.0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn erlang_mean_is_k_over_rate() {
        let d = Distribution::Erlang { k: 3, rate: 2.0 };
        assert!((d.mean() - 1.5).abs() < 1e-9);
    }
}
