//! Per-location sampling state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::grid::PointGraph;
use crate::core::point_id::Point;

/// Default weight of an ordinary location.
pub const DEFAULT_PRIORITY: u32 = 1;
/// Weight of the symmetric bootstrap anchors.
pub const ANCHOR_PRIORITY: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Full,
    Half,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrialRecord {
    pub intensity: u32,
    pub step_kind: StepKind,
    pub confidence: f64,
    pub detected: bool,
}

impl TrialRecord {
    #[inline]
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

#[derive(Debug, Clone)]
pub struct Location {
    pub id: String,
    pub point: Point,
    pub neighbors: Vec<String>,
    /// 0 = terminal. Otherwise a scheduling weight that also counts confident
    /// coarse trials.
    pub priority: u32,
    pub history: Vec<TrialRecord>,
    pub final_intensity: Option<u32>,
}

impl Location {
    fn new(id: &str, point: Point, neighbors: &[String]) -> Self {
        Self {
            id: id.to_string(),
            point,
            neighbors: neighbors.to_vec(),
            priority: DEFAULT_PRIORITY,
            history: Vec::new(),
            final_intensity: None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.priority == 0
    }

    #[inline]
    pub fn last_trial(&self) -> Option<&TrialRecord> {
        self.history.last()
    }

    /// Mark the threshold as determined and retire the location.
    pub fn finalize(&mut self, intensity: u32) {
        self.final_intensity = Some(intensity);
        self.priority = 0;
    }
}

/// Every tier-1 location of the graph, keyed by id.
#[derive(Debug, Clone)]
pub struct SamplingPool {
    locations: BTreeMap<String, Location>,
    anchors: Vec<String>,
}

impl SamplingPool {
    /// One fresh location per tier-1 point. The location closest to
    /// `anchor_target` and its axis reflections are raised to
    /// [`ANCHOR_PRIORITY`]; reflections missing from the graph are skipped.
    pub fn new(graph: &PointGraph, anchor_target: Point) -> Self {
        let locations: BTreeMap<String, Location> = graph
            .tier_1
            .iter()
            .map(|(id, entry)| (id.clone(), Location::new(id, entry.point, &entry.n_tier_1)))
            .collect();

        let mut pool = Self {
            locations,
            anchors: Vec::new(),
        };
        pool.seed_anchors(graph, anchor_target);
        pool
    }

    fn seed_anchors(&mut self, graph: &PointGraph, target: Point) {
        let nearest = self
            .locations
            .values()
            .map(|loc| {
                let dx = loc.point[0] - target[0];
                let dy = loc.point[1] - target[1];
                (loc.id.clone(), loc.point, dx * dx + dy * dy)
            })
            .min_by(|a, b| a.2.total_cmp(&b.2));
        let Some((center_id, center_point, _)) = nearest else {
            return;
        };

        let mut anchors = vec![center_id];
        let reflections = match graph.codec() {
            Ok(codec) => Vec::from(codec.reflections(center_point)),
            Err(err) => {
                warn!("cannot reflect anchor {}: {err}", anchors[0]);
                Vec::new()
            }
        };
        for reflected in reflections {
            match reflected {
                Ok(id) if self.locations.contains_key(&id) => {
                    if !anchors.contains(&id) {
                        anchors.push(id);
                    }
                }
                Ok(id) => warn!("anchor reflection {id} is not on the grid; skipping"),
                Err(err) => warn!("anchor reflection not encodable: {err}; skipping"),
            }
        }

        for id in &anchors {
            if let Some(loc) = self.locations.get_mut(id) {
                loc.priority = ANCHOR_PRIORITY;
            }
        }
        debug!("seeded {} anchor locations: {:?}", anchors.len(), anchors);
        self.anchors = anchors;
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Location> {
        self.locations.get_mut(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.locations.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn anchors(&self) -> &[String] {
        &self.anchors
    }

    /// Number of locations that still need trials.
    pub fn active_count(&self) -> usize {
        self.locations.values().filter(|l| !l.is_terminal()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.active_count() == 0
    }

    /// Thresholds of neighbours that are already terminal.
    pub fn terminal_neighbor_thresholds(&self, id: &str) -> Vec<u32> {
        let Some(loc) = self.locations.get(id) else {
            return Vec::new();
        };
        loc.neighbors
            .iter()
            .filter_map(|n| self.locations.get(n))
            .filter(|n| n.is_terminal())
            .filter_map(|n| n.final_intensity)
            .collect()
    }
}
