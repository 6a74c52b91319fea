use perimetry::app;
use perimetry::config::{RunConfig, SamplerConfig};
use perimetry::core::grid::PointGraph;
use perimetry::sampler::{Probe, Sampler, StepKind};

fn line(len: usize) -> PointGraph {
    let entries: Vec<_> = (1..=len)
        .map(|i| {
            let x = i as f64;
            let mut n = Vec::new();
            if i > 1 {
                n.push([x - 1.0, 1.0]);
            }
            if i < len {
                n.push([x + 1.0, 1.0]);
            }
            ([x, 1.0], n)
        })
        .collect();
    PointGraph::from_tier1(24.0, &entries).expect("line graph")
}

#[test]
fn five_location_line_settles_at_sixteen() {
    let graph = line(5);
    let mut sampler = Sampler::new(&graph, SamplerConfig::default());
    let mut observer = |p: &Probe| (1.0, p.intensity >= 16);

    let report = app::run(&mut sampler, &mut observer, &RunConfig::default()).expect("run");

    assert_eq!(report.thresholds.len(), 5);
    for (id, t) in &report.thresholds {
        assert_eq!(*t, Some(16), "location {id}");
    }
    for loc in sampler.pool().iter() {
        assert_eq!(loc.priority, 0);
        let trail: Vec<(u32, StepKind, bool)> = loc
            .history
            .iter()
            .map(|r| (r.intensity, r.step_kind, r.detected))
            .collect();
        assert_eq!(
            trail,
            vec![
                (16, StepKind::Full, true),
                (12, StepKind::Full, false),
                (14, StepKind::Half, false),
            ],
            "location {}",
            loc.id
        );
    }
    // Bootstrap round of 4, then the remaining anchor joins the full batches.
    assert_eq!(report.rounds, 4);
    assert_eq!(report.samples, 15);
}

#[test]
fn bootstrap_round_requests_half_the_batch() {
    let graph = line(5);
    let mut sampler = Sampler::new(&graph, SamplerConfig::default());
    let first = sampler.sample_default_batch();
    assert_eq!(first.len(), 4);
    let anchor = &sampler.pool().anchors()[0];
    assert!(first.iter().all(|p| &p.id != anchor));
    assert!(first.iter().all(|p| p.intensity == 16));
}
