//! Simulated observers that answer probes.

pub mod visual_field;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::config::ObserverConfig;
use crate::core::grid::PointGraph;
use crate::core::intensity::IntensityScale;
use crate::sampler::{Probe, Response};

pub use visual_field::VisualField;

/// Source of trial outcomes. One response per probe, same ids.
pub trait Observer {
    fn respond(&mut self, probes: &[Probe]) -> Vec<Response>;
}

impl<F> Observer for F
where
    F: FnMut(&Probe) -> (f64, bool),
{
    fn respond(&mut self, probes: &[Probe]) -> Vec<Response> {
        probes
            .iter()
            .map(|p| {
                let (confidence, detected) = self(p);
                Response::for_probe(p, confidence, detected)
            })
            .collect()
    }
}

/// Observer with a fixed ground-truth field and noisy confidence.
pub struct VirtualObserver {
    field: VisualField,
    rng: StdRng,
    confidence_gain: f64,
}

impl VirtualObserver {
    pub fn new(field: VisualField, rng: StdRng, confidence_gain: f64) -> Self {
        Self {
            field,
            rng,
            confidence_gain,
        }
    }

    /// Random field for `graph`, seeded from `cfg.seed` when present.
    pub fn from_config(graph: &PointGraph, scale: &IntensityScale, cfg: &ObserverConfig) -> Self {
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let field = VisualField::generate(graph, scale, cfg.max_defects, &mut rng);
        Self::new(field, rng, cfg.confidence_gain)
    }

    #[inline]
    pub fn field(&self) -> &VisualField {
        &self.field
    }

    fn confidence(&mut self) -> f64 {
        (self.confidence_gain * self.rng.random::<f64>()).min(1.0)
    }
}

impl Observer for VirtualObserver {
    fn respond(&mut self, probes: &[Probe]) -> Vec<Response> {
        probes
            .iter()
            .map(|p| {
                let detected = match self.field.threshold(&p.id) {
                    Some(t) => p.intensity as f64 >= t,
                    None => {
                        warn!("probe for {} has no ground truth; reporting unseen", p.id);
                        false
                    }
                };
                let confidence = self.confidence();
                Response::for_probe(p, confidence, detected)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::StepKind;
    use std::collections::BTreeMap;

    fn probe(id: &str, intensity: u32) -> Probe {
        Probe {
            id: id.into(),
            point: [0.0, 0.0],
            intensity,
            step_kind: StepKind::Full,
        }
    }

    #[test]
    fn detection_follows_ground_truth() {
        let field = VisualField::from_thresholds(BTreeMap::from([("a".to_string(), 13.5)]));
        let mut obs = VirtualObserver::new(field, StdRng::seed_from_u64(1), 5.0);
        let out = obs.respond(&[probe("a", 12), probe("a", 14), probe("b", 30)]);
        assert_eq!(out.len(), 3);
        assert!(!out[0].detected);
        assert!(out[1].detected);
        assert!(!out[2].detected);
        for r in &out {
            assert!((0.0..=1.0).contains(&r.confidence));
        }
    }

    #[test]
    fn closures_are_observers() {
        let mut obs = |p: &Probe| (1.0, p.intensity >= 16);
        let out = obs.respond(&[probe("x", 16), probe("y", 12)]);
        assert_eq!(out[0].id, "x");
        assert!(out[0].detected);
        assert!(!out[1].detected);
        assert_eq!(out[1].intensity, 12);
    }
}
