//! Batch selection over the sampling pool.
//!
//! Active locations are ordered by ascending priority, so locations that have
//! burned through more coarse trials (and the elevated anchors) come after
//! untouched ones. Ties keep id order.

use super::pool::SamplingPool;

/// Ids of up to `n` locations to probe next.
pub fn next_batch(pool: &SamplingPool, n: usize) -> Vec<String> {
    let mut active: Vec<(&str, u32)> = pool
        .iter()
        .filter(|loc| !loc.is_terminal())
        .map(|loc| (loc.id.as_str(), loc.priority))
        .collect();
    active.sort_by_key(|&(_, priority)| priority);
    active
        .into_iter()
        .take(n)
        .filter(|&(_, priority)| priority > 0)
        .map(|(id, _)| id.to_string())
        .collect()
}

/// The first round of a run requests half the nominal batch.
#[inline]
pub fn bootstrap_size(nominal: usize, batch_num: usize) -> usize {
    if batch_num == 1 { nominal / 2 } else { nominal }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::PointGraph;
    use crate::sampler::pool::ANCHOR_PRIORITY;

    fn strip(len: usize) -> PointGraph {
        let entries: Vec<_> = (0..len)
            .map(|i| {
                let x = i as f64;
                let mut n = Vec::new();
                if i > 0 {
                    n.push([x - 1.0, 1.0]);
                }
                if i + 1 < len {
                    n.push([x + 1.0, 1.0]);
                }
                ([x, 1.0], n)
            })
            .collect();
        PointGraph::from_tier1(24.0, &entries).unwrap()
    }

    #[test]
    fn ordinary_locations_precede_anchors() {
        let graph = strip(6);
        let pool = SamplingPool::new(&graph, [5.0, 1.0]);
        let batch = next_batch(&pool, 5);
        assert_eq!(batch.len(), 5);
        for id in &batch {
            assert_ne!(pool.get(id).unwrap().priority, ANCHOR_PRIORITY);
        }
        let all = next_batch(&pool, 100);
        assert_eq!(all.len(), 6);
        assert_eq!(pool.get(all.last().unwrap()).unwrap().priority, ANCHOR_PRIORITY);
    }

    #[test]
    fn terminal_locations_never_selected() {
        let graph = strip(4);
        let mut pool = SamplingPool::new(&graph, [0.0, 1.0]);
        let ids: Vec<String> = graph.ids().map(str::to_string).collect();
        pool.get_mut(&ids[0]).unwrap().finalize(10);
        pool.get_mut(&ids[2]).unwrap().finalize(12);
        let batch = next_batch(&pool, 4);
        assert_eq!(batch.len(), 2);
        assert!(!batch.contains(&ids[0]));
        assert!(!batch.contains(&ids[2]));
    }

    #[test]
    fn bootstrap_round_is_halved() {
        assert_eq!(bootstrap_size(8, 1), 4);
        assert_eq!(bootstrap_size(8, 2), 8);
        assert_eq!(bootstrap_size(7, 1), 3);
    }
}
