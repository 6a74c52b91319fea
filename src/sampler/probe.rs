use serde::{Deserialize, Serialize};

use super::pool::{StepKind, TrialRecord};
use crate::core::point_id::Point;

/// A stimulus to present at one location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Probe {
    pub id: String,
    pub point: Point,
    pub intensity: u32,
    pub step_kind: StepKind,
}

/// Observer's answer to a [`Probe`], matched back by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub id: String,
    pub point: Point,
    pub intensity: u32,
    pub step_kind: StepKind,
    pub confidence: f64,
    pub detected: bool,
}

impl Response {
    pub fn for_probe(probe: &Probe, confidence: f64, detected: bool) -> Self {
        Self {
            id: probe.id.clone(),
            point: probe.point,
            intensity: probe.intensity,
            step_kind: probe.step_kind,
            confidence,
            detected,
        }
    }

    pub fn record(&self) -> TrialRecord {
        TrialRecord {
            intensity: self.intensity,
            step_kind: self.step_kind,
            confidence: self.confidence,
            detected: self.detected,
        }
    }
}
