//! core/hexgrid.rs - Hexagonal tiling of a circular visual field.
//!
//! Rows are laid out in the first quadrant with every other row shifted by half
//! a cell, then mirrored into the remaining quadrants. Tier-1 neighbours are
//! the surrounding cell centres; tier-2 entries are the cell's hexagon vertices.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::grid::{GridError, PointGraph, Tier1Point, Tier2Point};
use super::point_id::{IdCodec, Point, round2};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HexGridParams {
    /// Field radius (degrees).
    pub a_limit: f64,
    /// Vertical distance between rows.
    pub row_height: f64,
}

impl Default for HexGridParams {
    fn default() -> Self {
        Self {
            a_limit: 24.0,
            row_height: 4.75,
        }
    }
}

impl HexGridParams {
    /// Horizontal cell pitch, `2h / √3`.
    #[inline]
    pub fn side(&self) -> f64 {
        self.row_height * 2.0 / 3f64.sqrt()
    }

    #[inline]
    fn inside(&self, p: Point) -> bool {
        p[0] * p[0] + p[1] * p[1] < self.a_limit * self.a_limit
    }
}

fn quadrant_points(params: &HexGridParams) -> Vec<Point> {
    let h = params.row_height;
    let side = params.side();
    let rows = ((params.a_limit - h / 2.0) / h).ceil().max(0.0) as usize;
    let mut out = Vec::new();
    for i in 0..rows {
        let y = h / 2.0 + i as f64 * h;
        let shift = side * (i % 2) as f64 / 2.0;
        let mut k = 0usize;
        loop {
            let x = k as f64 * side + shift;
            if x >= params.a_limit {
                break;
            }
            let p = [x, y];
            if params.inside(p) {
                out.push(p);
            }
            k += 1;
        }
    }
    out
}

/// Build the full tier-1/tier-2 point graph for `params`.
pub fn build(params: &HexGridParams) -> Result<PointGraph, GridError> {
    let codec = IdCodec::try_new(params.a_limit)?;
    if !params.row_height.is_finite() || params.row_height <= 0.0 {
        return Err(GridError::InvalidRowHeight(params.row_height));
    }
    let side = params.side();

    let mut centers: BTreeMap<String, Point> = BTreeMap::new();
    for [x, y] in quadrant_points(params) {
        for p in [[x, y], [-x, y], [-x, -y], [x, -y]] {
            let p = [round2(p[0]), round2(p[1])];
            centers.entry(codec.encode(p)?).or_insert(p);
        }
    }

    let vertices: Vec<Point> = (0..6)
        .map(|k| {
            let theta = k as f64 * PI / 3.0;
            [theta.cos() * side / 2.0, theta.sin() * side / 2.0]
        })
        .collect();

    let mut tier_1 = BTreeMap::new();
    let mut tier_2 = BTreeMap::new();
    let reach = 1.5 * side;
    for (id, p) in &centers {
        let mut n_tier_2 = Vec::new();
        for v in &vertices {
            let t = [round2(p[0] + v[0]), round2(p[1] + v[1])];
            if !params.inside(t) {
                continue;
            }
            let t_id = codec.encode(t)?;
            tier_2.insert(t_id.clone(), Tier2Point { point: t });
            n_tier_2.push(t_id);
        }

        let n_tier_1: Vec<String> = centers
            .iter()
            .filter(|(other, q)| {
                *other != id && ((q[0] - p[0]).powi(2) + (q[1] - p[1]).powi(2)).sqrt() <= reach
            })
            .map(|(other, _)| other.clone())
            .collect();

        tier_1.insert(
            id.clone(),
            Tier1Point {
                point: *p,
                n_tier_1,
                n_tier_2,
            },
        );
    }

    debug!(
        "hex grid: a_limit={} locations={} vertices={}",
        params.a_limit,
        tier_1.len(),
        tier_2.len()
    );

    let graph = PointGraph {
        a_limit: params.a_limit,
        tier_1,
        tier_2,
    };
    graph.validate()?;
    Ok(graph)
}
