//! core/grid.rs - Point graph: test locations and their adjacency.
//!
//! The graph is a static input to the sampler. Its persisted JSON form is keyed
//! by tier label:
//!
//! ```json
//! {
//!   "a_limit": 24.0,
//!   "tier_1": { "<id>": { "point": [x, y], "n_tier_1": ["<id>", …], "n_tier_2": ["<id>", …] } },
//!   "tier_2": { "<id>": { "point": [x, y] } }
//! }
//! ```
//!
//! Only `tier_1` and its `n_tier_1` lists drive sampling.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::point_id::{CodecError, IdCodec, Point};

#[derive(Debug, Error)]
pub enum GridError {
    #[error("failed to read point graph {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed point graph JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("point graph has no tier_1 locations")]
    Empty,
    #[error("location {id} lists unknown tier_1 neighbour {neighbor}")]
    UnknownNeighbor { id: String, neighbor: String },
    #[error("location {id} lists itself as a neighbour")]
    SelfNeighbor { id: String },
    #[error("location {id} lists unknown tier_2 vertex {vertex}")]
    UnknownVertex { id: String, vertex: String },
    #[error("location id {id} does not encode its point ({x}, {y})")]
    IdMismatch { id: String, x: f64, y: f64 },
    #[error("hex grid row height {0} must be finite and positive")]
    InvalidRowHeight(f64),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

fn default_a_limit() -> f64 {
    24.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tier1Point {
    pub point: Point,
    #[serde(default)]
    pub n_tier_1: Vec<String>,
    #[serde(default)]
    pub n_tier_2: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tier2Point {
    pub point: Point,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointGraph {
    #[serde(default = "default_a_limit")]
    pub a_limit: f64,
    pub tier_1: BTreeMap<String, Tier1Point>,
    #[serde(default)]
    pub tier_2: BTreeMap<String, Tier2Point>,
}

impl PointGraph {
    /// Build a tier-1-only graph from points and their neighbour points.
    /// Ids are derived through the codec.
    pub fn from_tier1(a_limit: f64, entries: &[(Point, Vec<Point>)]) -> Result<Self, GridError> {
        let codec = IdCodec::try_new(a_limit)?;
        let mut tier_1 = BTreeMap::new();
        for (point, neighbors) in entries {
            let id = codec.encode(*point)?;
            let n_tier_1 = neighbors
                .iter()
                .map(|p| codec.encode(*p))
                .collect::<Result<Vec<_>, _>>()?;
            tier_1.insert(
                id,
                Tier1Point {
                    point: *point,
                    n_tier_1,
                    n_tier_2: Vec::new(),
                },
            );
        }
        let graph = Self {
            a_limit,
            tier_1,
            tier_2: BTreeMap::new(),
        };
        graph.validate()?;
        Ok(graph)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, GridError> {
        let graph: Self = serde_json::from_str(text)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn to_json_string(&self) -> Result<String, GridError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GridError> {
        let path = path.as_ref();
        let text = self.to_json_string()?;
        fs::write(path, text).map_err(|source| GridError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Structural checks; any failure makes the graph unusable.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.tier_1.is_empty() {
            return Err(GridError::Empty);
        }
        let codec = IdCodec::try_new(self.a_limit)?;
        for (id, entry) in &self.tier_1 {
            let decoded = codec.decode(id)?;
            if (decoded[0] - entry.point[0]).abs() > 0.011
                || (decoded[1] - entry.point[1]).abs() > 0.011
            {
                return Err(GridError::IdMismatch {
                    id: id.clone(),
                    x: entry.point[0],
                    y: entry.point[1],
                });
            }
            for n in &entry.n_tier_1 {
                if n == id {
                    return Err(GridError::SelfNeighbor { id: id.clone() });
                }
                if !self.tier_1.contains_key(n) {
                    return Err(GridError::UnknownNeighbor {
                        id: id.clone(),
                        neighbor: n.clone(),
                    });
                }
            }
            for v in &entry.n_tier_2 {
                if !self.tier_2.contains_key(v) {
                    return Err(GridError::UnknownVertex {
                        id: id.clone(),
                        vertex: v.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Fails only for hand-built graphs that skipped [`Self::validate`].
    #[inline]
    pub fn codec(&self) -> Result<IdCodec, CodecError> {
        IdCodec::try_new(self.a_limit)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tier_1.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tier_1.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tier_1.keys().map(String::as_str)
    }

    pub fn point(&self, id: &str) -> Option<Point> {
        self.tier_1.get(id).map(|e| e.point)
    }

    pub fn neighbors(&self, id: &str) -> &[String] {
        self.tier_1
            .get(id)
            .map(|e| e.n_tier_1.as_slice())
            .unwrap_or(&[])
    }

    /// True when every tier-1 location is reachable from every other.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.tier_1.keys().next() else {
            return true;
        };
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut stack = vec![start.as_str()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            for n in self.neighbors(id) {
                if !seen.contains(n.as_str()) {
                    stack.push(n.as_str());
                }
            }
        }
        seen.len() == self.tier_1.len()
    }
}
