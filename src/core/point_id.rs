//! core/point_id.rs - Coordinate ⇄ location id transform.
//!
//! Ids are the decimal form of `yq * 100_000 + xq`, where `xq`/`yq` are the
//! coordinates shifted by `a_limit` and quantised to hundredths. The mapping is
//! pure, so the id of a reflected point can be computed without a lookup table.

use thiserror::Error;

/// (x, y) position in degrees of visual angle.
pub type Point = [f64; 2];

const QUANT: f64 = 100.0;
const ROW_STRIDE: u64 = 100_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("point ({x}, {y}) lies outside the ±{a_limit} field")]
    OutOfRange { x: f64, y: f64, a_limit: f64 },
    #[error("malformed location id {0:?}")]
    Malformed(String),
    #[error("field radius {0} is outside the codec range")]
    InvalidLimit(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdCodec {
    a_limit: f64,
}

impl IdCodec {
    pub fn try_new(a_limit: f64) -> Result<Self, CodecError> {
        if a_limit.is_finite() && a_limit > 0.0 && a_limit * 2.0 * QUANT < ROW_STRIDE as f64 {
            Ok(Self { a_limit })
        } else {
            Err(CodecError::InvalidLimit(a_limit))
        }
    }

    #[inline]
    pub fn a_limit(&self) -> f64 {
        self.a_limit
    }

    fn quantize(&self, v: f64) -> Option<u64> {
        let q = ((v + self.a_limit) * QUANT).round();
        if !q.is_finite() || q < 0.0 || q > 2.0 * self.a_limit * QUANT {
            return None;
        }
        Some(q as u64)
    }

    pub fn encode(&self, point: Point) -> Result<String, CodecError> {
        let out_of_range = || CodecError::OutOfRange {
            x: point[0],
            y: point[1],
            a_limit: self.a_limit,
        };
        let xq = self.quantize(point[0]).ok_or_else(out_of_range)?;
        let yq = self.quantize(point[1]).ok_or_else(out_of_range)?;
        Ok((yq * ROW_STRIDE + xq).to_string())
    }

    pub fn decode(&self, id: &str) -> Result<Point, CodecError> {
        let raw: u64 = id
            .parse()
            .map_err(|_| CodecError::Malformed(id.to_string()))?;
        let xq = raw % ROW_STRIDE;
        let yq = raw / ROW_STRIDE;
        let limit_q = (2.0 * self.a_limit * QUANT).round() as u64;
        if xq > limit_q || yq > limit_q {
            return Err(CodecError::Malformed(id.to_string()));
        }
        Ok([
            xq as f64 / QUANT - self.a_limit,
            yq as f64 / QUANT - self.a_limit,
        ])
    }

    /// Ids of the reflections across the vertical axis, both axes, and the
    /// horizontal axis, in that order.
    pub fn reflections(&self, point: Point) -> [Result<String, CodecError>; 3] {
        let [x, y] = point;
        [
            self.encode([-x, y]),
            self.encode([-x, -y]),
            self.encode([x, -y]),
        ]
    }
}

/// Round to two decimals, the precision ids carry.
#[inline]
pub fn round2(v: f64) -> f64 {
    (v * QUANT).round() / QUANT
}
