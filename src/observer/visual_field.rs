//! observer/visual_field.rs - Ground-truth thresholds for a simulated eye.
//!
//! A handful of defect sites get low thresholds; every other location is
//! reached breadth-first over tier-1 adjacency and sits a few levels above
//! its parent, so sensitivity falls off away from the defects.

use std::collections::{BTreeMap, VecDeque};

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::core::grid::PointGraph;
use crate::core::intensity::IntensityScale;

const RISE_CHOICES: [f64; 3] = [2.0, 3.0, 4.0];
const DEFECT_LEVELS: usize = 6;
const FALLBACK_SEED_LEVEL: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct VisualField {
    thresholds: BTreeMap<String, f64>,
}

impl VisualField {
    pub fn from_thresholds(thresholds: BTreeMap<String, f64>) -> Self {
        Self { thresholds }
    }

    /// Random field over `graph` with `0..max_defects` defect sites.
    pub fn generate<R: Rng + ?Sized>(
        graph: &PointGraph,
        scale: &IntensityScale,
        max_defects: usize,
        rng: &mut R,
    ) -> Self {
        let ids: Vec<&str> = graph.ids().collect();
        let mut thresholds: BTreeMap<String, f64> = BTreeMap::new();
        if ids.is_empty() {
            return Self { thresholds };
        }

        let n_defects = if max_defects == 0 {
            0
        } else {
            rng.random_range(0..max_defects)
        };
        if n_defects > 0 {
            let top = DEFECT_LEVELS.min(scale.len());
            for id in ids.choose_multiple(rng, n_defects) {
                let level = scale.levels()[rng.random_range(0..top)] as f64;
                let value = (level + rng.random::<f64>()).max(0.0);
                thresholds.insert(id.to_string(), value);
            }
        } else if let Some(id) = ids.choose(rng) {
            thresholds.insert(id.to_string(), FALLBACK_SEED_LEVEL + rng.random::<f64>());
        }
        debug!("visual field seeds: {:?}", thresholds);

        let lo = scale.min() as f64;
        let hi = scale.max() as f64;
        let mut frontier: VecDeque<String> = thresholds.keys().cloned().collect();
        while let Some(id) = frontier.pop_front() {
            let parent = thresholds[&id];
            for n in graph.neighbors(&id) {
                if thresholds.contains_key(n) {
                    continue;
                }
                let rise = RISE_CHOICES.choose(rng).copied().unwrap_or(RISE_CHOICES[0]);
                let value = (parent + rise + rng.random::<f64>()).clamp(lo, hi);
                thresholds.insert(n.clone(), value);
                frontier.push_back(n.clone());
            }
        }

        // Islands the spread never reached stay unseen.
        for id in ids {
            thresholds.entry(id.to_string()).or_insert(hi);
        }
        Self { thresholds }
    }

    #[inline]
    pub fn threshold(&self, id: &str) -> Option<f64> {
        self.thresholds.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.thresholds.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}
