//! Run loop: alternate batches and observer responses until every location
//! has a threshold.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::observer::{Observer, VisualField};
use crate::sampler::{Sampler, SamplerError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("no probe could be issued in round {round} with {active} locations still active")]
    Stalled { round: usize, active: usize },
    #[error("gave up after {rounds} rounds with {active} locations still active")]
    RoundLimit { rounds: usize, active: usize },
    #[error(transparent)]
    Sampler(#[from] SamplerError),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunReport {
    pub rounds: usize,
    pub samples: usize,
    pub thresholds: BTreeMap<String, Option<u32>>,
}

impl RunReport {
    /// `true − determined` per location, ascending. Locations without a
    /// determined threshold or ground truth are left out.
    pub fn errors_against(&self, field: &VisualField) -> Vec<f64> {
        let mut deltas: Vec<f64> = self
            .thresholds
            .iter()
            .filter_map(|(id, t)| Some(field.threshold(id)? - (*t)? as f64))
            .collect();
        deltas.sort_by(f64::total_cmp);
        deltas
    }

    pub fn mean_abs_error(&self, field: &VisualField) -> Option<f64> {
        let deltas = self.errors_against(field);
        if deltas.is_empty() {
            return None;
        }
        Some(deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64)
    }
}

/// Drive `sampler` with `observer` until every location is terminal.
pub fn run<O: Observer + ?Sized>(
    sampler: &mut Sampler,
    observer: &mut O,
    cfg: &RunConfig,
) -> Result<RunReport, RunError> {
    let batch_size = sampler.config().batch_size;
    let mut rounds = 0;
    while !sampler.is_complete() {
        if rounds >= cfg.max_rounds {
            return Err(RunError::RoundLimit {
                rounds,
                active: sampler.active_count(),
            });
        }
        rounds += 1;

        let batch = sampler.sample_batch(batch_size);
        if batch.is_empty() {
            if sampler.last_request() == 0 {
                debug!("round {rounds}: halved batch is empty");
                continue;
            }
            return Err(RunError::Stalled {
                round: rounds,
                active: sampler.active_count(),
            });
        }
        let responses = observer.respond(&batch);
        sampler.collect_response(&responses)?;
        debug!(
            "round {rounds}: {} probes, {} active",
            batch.len(),
            sampler.active_count()
        );
    }

    info!(
        "all {} locations determined after {rounds} rounds / {} samples",
        sampler.pool().len(),
        sampler.samples_issued()
    );
    Ok(RunReport {
        rounds,
        samples: sampler.samples_issued(),
        thresholds: sampler.thresholds(),
    })
}
