//! Node positions for the external renderer.
//!
//! Positions are not part of [`WordGraph`]; they are computed here at export
//! time only. Three candidate layouts are produced and the one with the widest
//! horizontal spread (largest variance of x) is kept.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use log::debug;

use crate::network::WordGraph;

/// Optimal distance parameter of the force-directed layout.
const SPRING_K: f64 = 3.0;
const SPRING_ITERATIONS: usize = 50;
const STRESS_ITERATIONS: usize = 100;
const STRESS_EPSILON: f64 = 1e-4;
const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    ForceDirected,
    StressMajorization,
    Circular,
}

impl LayoutKind {
    pub fn label(self) -> &'static str {
        match self {
            LayoutKind::ForceDirected => "force-directed",
            LayoutKind::StressMajorization => "stress-majorization",
            LayoutKind::Circular => "circular",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub kind: LayoutKind,
    /// One `[x, y]` per graph node, in node order, within `[-1, 1]`.
    pub positions: Vec<[f64; 2]>,
}

impl Layout {
    /// Population variance of the x coordinates.
    pub fn x_variance(&self) -> f64 {
        let n = self.positions.len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.positions.iter().map(|p| p[0]).sum::<f64>() / n as f64;
        self.positions
            .iter()
            .map(|p| (p[0] - mean).powi(2))
            .sum::<f64>()
            / n as f64
    }
}

/// Center on the origin and scale so the largest coordinate magnitude is 1.
fn rescale(positions: &mut [[f64; 2]]) {
    let n = positions.len();
    if n == 0 {
        return;
    }
    for axis in 0..2 {
        let mean = positions.iter().map(|p| p[axis]).sum::<f64>() / n as f64;
        for p in positions.iter_mut() {
            p[axis] -= mean;
        }
    }
    let lim = positions
        .iter()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(0.0_f64, f64::max);
    if lim > 0.0 {
        for p in positions.iter_mut() {
            p[0] /= lim;
            p[1] /= lim;
        }
    }
}

// Low-discrepancy starting point in the unit square (R2 sequence).
fn seed_position(i: usize) -> [f64; 2] {
    const A1: f64 = 0.754_877_666_246_692_7;
    const A2: f64 = 0.569_840_290_998_053_3;
    let i = i as f64 + 1.0;
    [(0.5 + A1 * i).fract(), (0.5 + A2 * i).fract()]
}

fn edge_weight(graph: &WordGraph, i: usize, j: usize) -> f64 {
    graph
        .neighbors(i)
        .iter()
        .find(|(k, _)| *k == j)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

pub fn circular(graph: &WordGraph) -> Layout {
    let n = graph.node_count();
    let positions = (0..n)
        .map(|i| {
            if n == 1 {
                [0.0, 0.0]
            } else {
                let theta = TAU * i as f64 / n as f64;
                [theta.cos(), theta.sin()]
            }
        })
        .collect();
    Layout {
        kind: LayoutKind::Circular,
        positions,
    }
}

/// Fruchterman-Reingold with edge weights as attraction strength.
pub fn force_directed(graph: &WordGraph) -> Layout {
    let n = graph.node_count();
    let mut pos: Vec<[f64; 2]> = (0..n).map(seed_position).collect();

    let span = (0..2)
        .map(|axis| {
            let (lo, hi) = pos.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
            hi - lo
        })
        .fold(0.0_f64, f64::max);
    let mut temperature = span.max(MIN_DISTANCE) * 0.1;
    let cooling = temperature / (SPRING_ITERATIONS as f64 + 1.0);

    for _ in 0..SPRING_ITERATIONS {
        let mut displacement = vec![[0.0_f64; 2]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = SPRING_K * SPRING_K / (dist * dist)
                    - edge_weight(graph, i, j) * dist / SPRING_K;
                displacement[i][0] += dx * force;
                displacement[i][1] += dy * force;
            }
        }
        for i in 0..n {
            let [dx, dy] = displacement[i];
            let length = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            pos[i][0] += dx * temperature / length;
            pos[i][1] += dy * temperature / length;
        }
        temperature -= cooling;
    }

    rescale(&mut pos);
    Layout {
        kind: LayoutKind::ForceDirected,
        positions: pos,
    }
}

// All-pairs hop distances; unreachable pairs get one more than the longest path.
fn hop_distances(graph: &WordGraph) -> Vec<Vec<f64>> {
    let n = graph.node_count();
    let mut dist = vec![vec![-1.0_f64; n]; n];
    let mut longest = 0.0_f64;
    for (s, row) in dist.iter_mut().enumerate() {
        row[s] = 0.0;
        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            for &(w, _) in graph.neighbors(v) {
                if row[w] < 0.0 {
                    row[w] = row[v] + 1.0;
                    longest = longest.max(row[w]);
                    queue.push_back(w);
                }
            }
        }
    }
    for row in dist.iter_mut() {
        for d in row.iter_mut() {
            if *d < 0.0 {
                *d = longest + 1.0;
            }
        }
    }
    dist
}

/// Localized stress majorization over hop distances, started from the circle.
pub fn stress_majorization(graph: &WordGraph) -> Layout {
    let n = graph.node_count();
    let dist = hop_distances(graph);
    let mut pos = circular(graph).positions;

    for iteration in 0..STRESS_ITERATIONS {
        let mut moved = 0.0_f64;
        for i in 0..n {
            let mut num = [0.0_f64; 2];
            let mut denom = 0.0_f64;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = dist[i][j];
                let w = 1.0 / (d * d);
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let norm = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                num[0] += w * (pos[j][0] + d * dx / norm);
                num[1] += w * (pos[j][1] + d * dy / norm);
                denom += w;
            }
            if denom > 0.0 {
                let next = [num[0] / denom, num[1] / denom];
                moved = moved.max((next[0] - pos[i][0]).abs().max((next[1] - pos[i][1]).abs()));
                pos[i] = next;
            }
        }
        if moved < STRESS_EPSILON {
            debug!("stress majorization settled after {} iterations", iteration + 1);
            break;
        }
    }

    rescale(&mut pos);
    Layout {
        kind: LayoutKind::StressMajorization,
        positions: pos,
    }
}

/// Compute all candidates and keep the one with the largest x variance.
pub fn select_layout(graph: &WordGraph) -> Layout {
    let candidates = [force_directed(graph), stress_majorization(graph), circular(graph)];
    let mut best: Option<Layout> = None;
    for candidate in candidates {
        let better = match &best {
            Some(current) => candidate.x_variance() > current.x_variance(),
            None => true,
        };
        if better {
            best = Some(candidate);
        }
    }
    let best = best.unwrap_or_else(|| circular(graph));
    debug!(
        "layout {} selected (x variance {:.4})",
        best.kind.label(),
        best.x_variance()
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooccurrence::{CorpusPairCounter, TermPair};
    use crate::network::build_graph;

    fn graph() -> WordGraph {
        let corpus: CorpusPairCounter = [
            (TermPair::new("経済", "市場"), 3.0),
            (TermPair::new("市場", "価格"), 2.0),
            (TermPair::new("価格", "需要"), 1.5),
            (TermPair::new("需要", "経済"), 1.0),
            (TermPair::new("政策", "経済"), 0.5),
        ]
        .into_iter()
        .collect();
        build_graph(&corpus, 10).unwrap()
    }

    fn in_unit_box(layout: &Layout) -> bool {
        layout
            .positions
            .iter()
            .all(|p| p[0].abs() <= 1.0 + 1e-9 && p[1].abs() <= 1.0 + 1e-9)
    }

    #[test]
    fn every_layout_places_every_node() {
        let g = graph();
        for layout in [force_directed(&g), stress_majorization(&g), circular(&g)] {
            assert_eq!(layout.positions.len(), g.node_count());
            assert!(in_unit_box(&layout), "{}", layout.kind.label());
            assert!(layout.positions.iter().all(|p| p[0].is_finite() && p[1].is_finite()));
        }
    }

    #[test]
    fn layouts_are_deterministic() {
        let g = graph();
        assert_eq!(force_directed(&g).positions, force_directed(&g).positions);
        assert_eq!(
            stress_majorization(&g).positions,
            stress_majorization(&g).positions
        );
    }

    #[test]
    fn selection_maximizes_x_variance() {
        let g = graph();
        let chosen = select_layout(&g);
        for other in [force_directed(&g), stress_majorization(&g), circular(&g)] {
            assert!(chosen.x_variance() >= other.x_variance());
        }
    }

    #[test]
    fn variance_of_known_points() {
        let layout = Layout {
            kind: LayoutKind::Circular,
            positions: vec![[-1.0, 0.0], [1.0, 0.0]],
        };
        assert!((layout.x_variance() - 1.0).abs() < 1e-12);
    }
}
