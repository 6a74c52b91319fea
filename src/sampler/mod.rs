//! Adaptive threshold sampler.
//!
//! Owns the per-location pool and drives it through rounds of
//! [`Sampler::sample_batch`] / [`Sampler::collect_response`]. Everything runs
//! synchronously on the caller's thread; the pool is never shared.

pub mod pool;
pub mod probe;
pub mod scheduler;
pub mod staircase;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::config::SamplerConfig;
use crate::core::grid::PointGraph;
use crate::core::intensity::IntensityScale;

pub use pool::{Location, SamplingPool, StepKind, TrialRecord};
pub use probe::{Probe, Response};
pub use staircase::{CONFIDENCE_THRESHOLD, ProbeDecision, TrialOutcome};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplerError {
    #[error("response for unknown location {0}")]
    UnknownLocation(String),
    #[error("response for {0}, whose threshold is already final")]
    AlreadyFinal(String),
    #[error("response for {id} has intensity {intensity}, which is not on the scale")]
    OffScale { id: String, intensity: u32 },
    #[error("response for {id} has confidence {confidence} outside [0, 1]")]
    BadConfidence { id: String, confidence: f64 },
}

pub struct Sampler {
    pool: SamplingPool,
    scale: IntensityScale,
    cfg: SamplerConfig,
    batch_num: usize,
    samples_issued: usize,
    last_request: usize,
}

impl Sampler {
    pub fn new(graph: &PointGraph, cfg: SamplerConfig) -> Self {
        Self::with_scale(graph, cfg, IntensityScale::standard())
    }

    pub fn with_scale(graph: &PointGraph, cfg: SamplerConfig, scale: IntensityScale) -> Self {
        let half = graph.a_limit / 2.0;
        let target = cfg.anchor_target.unwrap_or([half, half]);
        Self {
            pool: SamplingPool::new(graph, target),
            scale,
            cfg,
            batch_num: 1,
            samples_issued: 0,
            last_request: 0,
        }
    }

    #[inline]
    pub fn pool(&self) -> &SamplingPool {
        &self.pool
    }

    #[inline]
    pub fn scale(&self) -> &IntensityScale {
        &self.scale
    }

    #[inline]
    pub fn config(&self) -> &SamplerConfig {
        &self.cfg
    }

    /// Index of the next batch (1-based).
    #[inline]
    pub fn batch_num(&self) -> usize {
        self.batch_num
    }

    #[inline]
    pub fn samples_issued(&self) -> usize {
        self.samples_issued
    }

    /// Number of locations the last [`Self::sample_batch`] asked the
    /// scheduler for. Zero when a halved first batch rounded down.
    #[inline]
    pub fn last_request(&self) -> usize {
        self.last_request
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn is_complete(&self) -> bool {
        self.pool.is_complete()
    }

    /// Next intensity decision for one location.
    pub fn next_probe(&self, id: &str) -> ProbeDecision {
        staircase::next_probe(&self.pool, &self.scale, id)
    }

    /// Select locations and build their probes. Locations with no further
    /// trial this round are left out.
    pub fn sample_batch(&mut self, batch_size: usize) -> Vec<Probe> {
        let n = scheduler::bootstrap_size(batch_size, self.batch_num);
        self.last_request = n;
        let ids = scheduler::next_batch(&self.pool, n);

        let mut batch = Vec::with_capacity(ids.len());
        for id in ids {
            match self.next_probe(&id) {
                ProbeDecision::Probe {
                    intensity,
                    step_kind,
                } => {
                    let Some(loc) = self.pool.get(&id) else {
                        continue;
                    };
                    batch.push(Probe {
                        point: loc.point,
                        id,
                        intensity,
                        step_kind,
                    });
                }
                decision => debug!("location {id} skipped this round: {decision:?}"),
            }
        }

        self.batch_num += 1;
        self.samples_issued += batch.len();
        batch
    }

    /// [`Self::sample_batch`] with the configured nominal size.
    pub fn sample_default_batch(&mut self) -> Vec<Probe> {
        self.sample_batch(self.cfg.batch_size)
    }

    /// Validate every response, then fold them into the pool in order.
    pub fn collect_response(
        &mut self,
        responses: &[Response],
    ) -> Result<Vec<TrialOutcome>, SamplerError> {
        for r in responses {
            match self.pool.get(&r.id) {
                None => return Err(SamplerError::UnknownLocation(r.id.clone())),
                Some(loc) if loc.is_terminal() => {
                    return Err(SamplerError::AlreadyFinal(r.id.clone()));
                }
                Some(_) => {}
            }
            if !self.scale.contains(r.intensity) {
                return Err(SamplerError::OffScale {
                    id: r.id.clone(),
                    intensity: r.intensity,
                });
            }
            if !(0.0..=1.0).contains(&r.confidence) {
                return Err(SamplerError::BadConfidence {
                    id: r.id.clone(),
                    confidence: r.confidence,
                });
            }
        }

        let legacy = self.cfg.legacy_half_step;
        let outcomes: Vec<TrialOutcome> = responses
            .iter()
            .map(|r| staircase::apply_response(&mut self.pool, &self.scale, legacy, r))
            .collect();
        let retired = outcomes
            .iter()
            .filter(|o| matches!(o, TrialOutcome::Finalized(_)))
            .count();
        debug!(
            "collected {} responses, {retired} retired, {} active",
            responses.len(),
            self.pool.active_count()
        );
        Ok(outcomes)
    }

    /// Determined thresholds by location id.
    pub fn thresholds(&self) -> BTreeMap<String, Option<u32>> {
        self.pool
            .iter()
            .map(|loc| (loc.id.clone(), loc.final_intensity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> PointGraph {
        PointGraph::from_tier1(
            24.0,
            &[
                ([1.0, 1.0], vec![[2.0, 1.0]]),
                ([2.0, 1.0], vec![[1.0, 1.0]]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn first_batch_is_halved_and_counted() {
        let graph = pair();
        let mut sampler = Sampler::new(&graph, SamplerConfig::default());
        let batch = sampler.sample_batch(2);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].intensity, 16);
        assert_eq!(batch[0].step_kind, StepKind::Full);
        assert_eq!(sampler.batch_num(), 2);
        assert_eq!(sampler.samples_issued(), 1);
        let batch = sampler.sample_batch(2);
        assert_eq!(batch.len(), 2);
        assert_eq!(sampler.samples_issued(), 3);
    }

    #[test]
    fn invalid_responses_leave_pool_untouched() {
        let graph = pair();
        let mut sampler = Sampler::new(&graph, SamplerConfig::default());
        let probe = sampler.sample_batch(4).remove(0);
        let good = Response::for_probe(&probe, 1.0, true);
        let mut off = good.clone();
        off.intensity = 15;
        assert_eq!(
            sampler.collect_response(&[good.clone(), off]),
            Err(SamplerError::OffScale {
                id: probe.id.clone(),
                intensity: 15
            })
        );
        assert!(sampler.pool().get(&probe.id).unwrap().history.is_empty());

        let mut stranger = good.clone();
        stranger.id = "1".into();
        assert!(matches!(
            sampler.collect_response(&[stranger]),
            Err(SamplerError::UnknownLocation(_))
        ));

        let mut wild = good;
        wild.confidence = 1.5;
        assert!(matches!(
            sampler.collect_response(&[wild]),
            Err(SamplerError::BadConfidence { .. })
        ));
    }

    #[test]
    fn late_answers_for_finished_locations_are_refused() {
        let graph = pair();
        let mut sampler = Sampler::new(&graph, SamplerConfig::default());
        let probe = sampler.sample_batch(2).remove(0);
        let ceiling = Response {
            intensity: 28,
            ..Response::for_probe(&probe, 1.0, false)
        };
        assert_eq!(
            sampler.collect_response(&[ceiling]),
            Ok(vec![TrialOutcome::Finalized(30)])
        );

        for (intensity, detected) in [(16, true), (2, true)] {
            let late = Response {
                intensity,
                ..Response::for_probe(&probe, 1.0, detected)
            };
            assert_eq!(
                sampler.collect_response(&[late]),
                Err(SamplerError::AlreadyFinal(probe.id.clone()))
            );
        }
        let loc = sampler.pool().get(&probe.id).unwrap();
        assert_eq!(loc.priority, 0);
        assert_eq!(loc.final_intensity, Some(30));
        assert_eq!(loc.history.len(), 1);
        assert_eq!(sampler.active_count(), 1);
    }

    #[test]
    fn exhausted_location_is_left_out_of_the_batch() {
        let graph = pair();
        let mut sampler = Sampler::new(&graph, SamplerConfig::default());
        let ids: Vec<String> = graph.ids().map(str::to_string).collect();
        let loc = sampler.pool.get_mut(&ids[0]).unwrap();
        loc.history.push(TrialRecord {
            intensity: 2,
            step_kind: StepKind::Full,
            confidence: 1.0,
            detected: true,
        });
        assert_ne!(loc.priority, 0);

        assert_eq!(
            sampler.next_probe(&ids[0]),
            ProbeDecision::Exhausted {
                from: 2,
                step: 4,
                upward: false,
            }
        );
        let batch = sampler.sample_batch(4);
        assert!(batch.iter().all(|p| p.id != ids[0]));
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, ids[1]);
        assert_eq!(sampler.active_count(), 2);
    }

    #[test]
    fn halved_first_batch_can_be_empty() {
        let graph = pair();
        let mut sampler = Sampler::new(&graph, SamplerConfig::default());
        assert!(sampler.sample_batch(1).is_empty());
        assert_eq!(sampler.last_request(), 0);
        assert_eq!(sampler.sample_batch(1).len(), 1);
        assert_eq!(sampler.last_request(), 1);
    }
}
