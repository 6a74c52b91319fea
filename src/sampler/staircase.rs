//! Staircase engine: next-intensity selection and response interpretation.
//!
//! A location starts at a neighbour-informed level and moves by the coarse
//! step while its confident answers agree. The first disagreement (a reversal)
//! switches to the fine step for one refinement trial, whose confident answer
//! settles the threshold. Answers below [`CONFIDENCE_THRESHOLD`] are recorded
//! and the same probe is repeated.

use tracing::{debug, warn};

use super::pool::{SamplingPool, StepKind, TrialRecord};
use super::probe::Response;
use crate::core::intensity::IntensityScale;

pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// What the engine wants to do next at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDecision {
    Probe { intensity: u32, step_kind: StepKind },
    /// The last confident trial was a refinement; nothing left to ask.
    Finished,
    /// The next step would leave the intensity scale.
    Exhausted { from: u32, step: u32, upward: bool },
}

/// Effect of one response on its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// Confidence too low; the probe will be repeated.
    Inconclusive,
    /// Confident coarse trial; the search continues.
    Continue,
    /// Threshold determined and the location retired.
    Finalized(u32),
    /// Threshold recorded by a refinement hit while the location stays active
    /// (legacy half-step behaviour).
    Recorded(u32),
}

/// Coarse step while every confident answer agrees, fine step after a reversal.
pub fn step_size(history: &[TrialRecord], scale: &IntensityScale) -> (u32, StepKind) {
    let mut flags = history
        .iter()
        .filter(|r| r.is_confident(CONFIDENCE_THRESHOLD))
        .map(|r| r.detected);
    let Some(first) = flags.next() else {
        return (scale.full_step(), StepKind::Full);
    };
    if flags.all(|f| f == first) {
        (scale.full_step(), StepKind::Full)
    } else {
        (scale.half_step(), StepKind::Half)
    }
}

/// Starting level for an untested location: mean of terminal neighbours'
/// thresholds snapped down onto the scale, or the scale midpoint.
pub fn neighbor_estimate(pool: &SamplingPool, scale: &IntensityScale, id: &str) -> u32 {
    let known = pool.terminal_neighbor_thresholds(id);
    if known.is_empty() {
        return scale.midpoint();
    }
    let mean = known.iter().map(|&v| v as f64).sum::<f64>() / known.len() as f64;
    scale.snap_floor(mean)
}

pub fn next_probe(pool: &SamplingPool, scale: &IntensityScale, id: &str) -> ProbeDecision {
    let Some(loc) = pool.get(id) else {
        return ProbeDecision::Finished;
    };
    let Some(last) = loc.last_trial() else {
        return ProbeDecision::Probe {
            intensity: neighbor_estimate(pool, scale, id),
            step_kind: StepKind::Full,
        };
    };

    if !last.is_confident(CONFIDENCE_THRESHOLD) {
        return ProbeDecision::Probe {
            intensity: last.intensity,
            step_kind: last.step_kind,
        };
    }
    if last.step_kind != StepKind::Full {
        return ProbeDecision::Finished;
    }

    let (step, step_kind) = step_size(&loc.history, scale);
    let upward = !last.detected;
    let next = if upward {
        scale.step_up(last.intensity, step)
    } else {
        scale.step_down(last.intensity, step)
    };
    match next {
        Some(intensity) => ProbeDecision::Probe {
            intensity,
            step_kind,
        },
        None => {
            warn!(
                "location {id}: stepping {} {step} from {} leaves the intensity scale",
                if upward { "up" } else { "down" },
                last.intensity
            );
            ProbeDecision::Exhausted {
                from: last.intensity,
                step,
                upward,
            }
        }
    }
}

/// Threshold implied by a missed refinement trial: the most recent earlier
/// confident trial if it was seen, otherwise the confident trial before that.
fn threshold_after_missed_refinement(history: &[TrialRecord]) -> Option<u32> {
    let earlier = &history[..history.len().saturating_sub(1)];
    let mut confident = earlier
        .iter()
        .rev()
        .filter(|r| r.is_confident(CONFIDENCE_THRESHOLD));
    let prev = confident.next()?;
    if prev.detected {
        return Some(prev.intensity);
    }
    confident.next().map(|r| r.intensity)
}

/// Record `response` in its location's history and update priority and
/// threshold. `legacy_half_step` keeps a refinement hit active after recording
/// its threshold instead of retiring the location.
pub fn apply_response(
    pool: &mut SamplingPool,
    scale: &IntensityScale,
    legacy_half_step: bool,
    response: &Response,
) -> TrialOutcome {
    let Some(loc) = pool.get_mut(&response.id) else {
        return TrialOutcome::Inconclusive;
    };
    loc.history.push(response.record());

    if response.confidence < CONFIDENCE_THRESHOLD {
        return TrialOutcome::Inconclusive;
    }

    match response.step_kind {
        StepKind::Half => {
            if response.detected {
                if legacy_half_step {
                    // Threshold set but priority left untouched; the location
                    // keeps being scheduled and reports Finished.
                    loc.final_intensity = Some(response.intensity);
                    return TrialOutcome::Recorded(response.intensity);
                }
                loc.finalize(response.intensity);
                return TrialOutcome::Finalized(response.intensity);
            }
            let threshold = threshold_after_missed_refinement(&loc.history).unwrap_or_else(|| {
                let fallback = scale.next_above(response.intensity);
                warn!(
                    "location {}: no earlier confident trial behind refinement miss; using {fallback}",
                    loc.id
                );
                fallback
            });
            loc.finalize(threshold);
            TrialOutcome::Finalized(threshold)
        }
        StepKind::Full => {
            loc.priority += 1;
            if response.intensity >= scale.second_highest() && !response.detected {
                loc.finalize(scale.max());
                debug!("location {}: unseen near ceiling, threshold {}", loc.id, scale.max());
                return TrialOutcome::Finalized(scale.max());
            }
            if response.intensity <= scale.second_lowest() && response.detected {
                loc.finalize(scale.min());
                debug!("location {}: seen near floor, threshold {}", loc.id, scale.min());
                return TrialOutcome::Finalized(scale.min());
            }
            TrialOutcome::Continue
        }
    }
}
