//! Exponential encoding of advertised QoS metrics.
//!
//! A metric travels in 16 bits: a 3-bit exponent followed by a 13-bit
//! mantissa, and stands for `mantissa * BASE^exponent`. Encoding picks the
//! smallest exponent whose quantization step keeps the mantissa within
//! [`MANTISSA_MAX`], so small values stay exact and large values lose at most
//! one step of width `BASE^exponent`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Base of the exponential representation.
pub const METRIC_BASE: u32 = 8;

/// Largest mantissa used when choosing an exponent.
pub const MANTISSA_MAX: u32 = 8191;

/// Exponents must stay below this to fit in three bits.
pub const EXPONENT_LIMIT: u32 = 8;

const MANTISSA_MASK: u32 = 0x1FFF;

/// A metric in its compact (mantissa, exponent) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedMetric {
    /// 13-bit mantissa.
    pub mantissa: u16,
    /// 3-bit exponent.
    pub exponent: u8,
}

impl EncodedMetric {
    /// Pack into the 16-bit wire field: exponent in the top three bits.
    pub fn to_bits(self) -> u16 {
        (u16::from(self.exponent) << 13) | (self.mantissa & MANTISSA_MASK as u16)
    }

    /// Unpack from the 16-bit wire field.
    pub fn from_bits(bits: u16) -> Self {
        Self {
            mantissa: bits & MANTISSA_MASK as u16,
            exponent: (bits >> 13) as u8,
        }
    }

    /// The linear value this metric stands for.
    pub fn value(self) -> f64 {
        decode(self.mantissa, self.exponent)
    }

    /// Width of one quantization step at this exponent.
    pub fn step(self) -> f64 {
        quantization_step(self.exponent)
    }
}

/// Encode a linear value with the protocol's base and mantissa limit.
pub fn encode(value: f64) -> Result<EncodedMetric, CoreError> {
    encode_with(value, METRIC_BASE, MANTISSA_MAX)
}

/// Encode a linear value with an explicit base and mantissa limit.
///
/// `step = (value - 1) / mantissa_max`; the exponent is 0 when `step < 1`,
/// otherwise `floor(log_base(step)) + 1`. The exponent is found by repeated
/// multiplication so exact powers of the base are never misrounded by a
/// floating-point logarithm.
pub fn encode_with(value: f64, base: u32, mantissa_max: u32) -> Result<EncodedMetric, CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::MetricRange { value, exponent: 0 });
    }

    let base = f64::from(base);
    let step = (value - 1.0) / f64::from(mantissa_max);

    let mut exponent: u32 = 0;
    if step >= 1.0 {
        let mut scale = 1.0;
        while step >= scale {
            scale *= base;
            exponent += 1;
        }
    }

    if exponent >= EXPONENT_LIMIT {
        return Err(CoreError::MetricRange { value, exponent });
    }

    let mantissa = (value / base.powi(exponent as i32)).trunc() as u32;
    if mantissa > MANTISSA_MASK {
        return Err(CoreError::MetricRange { value, exponent });
    }

    Ok(EncodedMetric {
        mantissa: mantissa as u16,
        exponent: exponent as u8,
    })
}

/// Decode `mantissa * METRIC_BASE^exponent`.
pub fn decode(mantissa: u16, exponent: u8) -> f64 {
    f64::from(mantissa) * quantization_step(exponent)
}

/// Width of one quantization step for the given exponent.
pub fn quantization_step(exponent: u8) -> f64 {
    f64::from(METRIC_BASE).powi(i32::from(exponent))
}

/// Largest value that encodes without a range error.
pub fn max_representable() -> f64 {
    f64::from(MANTISSA_MAX) * quantization_step((EXPONENT_LIMIT - 1) as u8)
}
