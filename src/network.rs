//! Co-occurrence network and node centrality.
//!
//! - **Degree**: degree / (n - 1), a self-loop counting twice
//! - **Betweenness**: Brandes over hop-count shortest paths, normalized
//! - **PageRank**: weighted power iteration

use std::collections::{HashMap, VecDeque};

use log::{info, warn};
use serde::Serialize;

use crate::cooccurrence::CorpusPairCounter;
use crate::error::{MinerError, MinerResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordNode {
    pub term: String,
    pub degree_centrality: f64,
    pub betweenness_centrality: f64,
    pub pagerank: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Undirected weighted graph over the strongest corpus pairs.
#[derive(Debug, Clone, Serialize)]
pub struct WordGraph {
    pub nodes: Vec<WordNode>,
    pub edges: Vec<WordEdge>,
    #[serde(skip)]
    adjacency: Vec<Vec<(usize, f64)>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl WordGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, term: &str) -> Option<&WordNode> {
        self.index.get(term).map(|&i| &self.nodes[i])
    }

    /// Neighbour indices and edge weights of node `i`.
    pub fn neighbors(&self, i: usize) -> &[(usize, f64)] {
        &self.adjacency[i]
    }

    /// Nodes ordered by PageRank, highest first.
    pub fn ranked_nodes(&self) -> Vec<&WordNode> {
        let mut nodes: Vec<&WordNode> = self.nodes.iter().collect();
        nodes.sort_by(|a, b| {
            b.pagerank
                .partial_cmp(&a.pagerank)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        });
        nodes
    }
}

pub struct PageRankConfig {
    pub damping_factor: f64,
    pub max_iterations: usize,
    /// Per-node tolerance; iteration stops when the L1 delta drops below `n * tolerance`.
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Build the network from the `top_n` heaviest pairs and score every node.
///
/// A pair of a term with itself becomes a self-loop on that node. Returns
/// `InsufficientCooccurrence` when nothing is selected.
pub fn build_graph(corpus: &CorpusPairCounter, top_n: usize) -> MinerResult<WordGraph> {
    let top = corpus.most_common(top_n);
    if top.is_empty() {
        return Err(MinerError::InsufficientCooccurrence);
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut terms: Vec<String> = Vec::new();
    let mut edges = Vec::with_capacity(top.len());
    let mut endpoints = Vec::with_capacity(top.len());
    for (pair, weight) in &top {
        let a = intern(&mut index, &mut terms, pair.first());
        let b = intern(&mut index, &mut terms, pair.second());
        endpoints.push((a, b, *weight));
        edges.push(WordEdge {
            source: pair.first().to_string(),
            target: pair.second().to_string(),
            weight: *weight,
        });
    }

    let n = terms.len();
    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for &(a, b, w) in &endpoints {
        adjacency[a].push((b, w));
        // A loop is stored once.
        if a != b {
            adjacency[b].push((a, w));
        }
    }

    let degree = degree_centrality(&adjacency);
    let betweenness = betweenness_centrality(&adjacency);
    let rank = pagerank(&adjacency, &PageRankConfig::default());

    let nodes = terms
        .into_iter()
        .enumerate()
        .map(|(i, term)| WordNode {
            term,
            degree_centrality: degree[i],
            betweenness_centrality: betweenness[i],
            pagerank: rank[i],
        })
        .collect();

    let loops = top.iter().filter(|(pair, _)| pair.is_self_pair()).count();
    info!(
        "co-occurrence network: {} nodes, {} edges ({} self-loops)",
        n,
        edges.len(),
        loops
    );
    Ok(WordGraph {
        nodes,
        edges,
        adjacency,
        index,
    })
}

// Node id for `term`, allocated in first-seen order.
fn intern(index: &mut HashMap<String, usize>, terms: &mut Vec<String>, term: &str) -> usize {
    if let Some(&i) = index.get(term) {
        return i;
    }
    let i = terms.len();
    index.insert(term.to_string(), i);
    terms.push(term.to_string());
    i
}

/// Degree over `n - 1`, with a self-loop adding 2 to the degree. A lone node
/// scores 1.
pub fn degree_centrality(adjacency: &[Vec<(usize, f64)>]) -> Vec<f64> {
    let n = adjacency.len();
    if n <= 1 {
        return vec![1.0; n];
    }
    let denom = (n - 1) as f64;
    adjacency
        .iter()
        .enumerate()
        .map(|(u, neighbors)| {
            let degree: usize = neighbors
                .iter()
                .map(|&(v, _)| if v == u { 2 } else { 1 })
                .sum();
            degree as f64 / denom
        })
        .collect()
}

/// Betweenness centrality via Brandes' algorithm on hop distances.
///
/// Every source is visited, so each undirected path is counted from both
/// ends; the `1 / ((n-1)(n-2))` scale accounts for that. Self-loops never lie
/// on a shortest path.
pub fn betweenness_centrality(adjacency: &[Vec<(usize, f64)>]) -> Vec<f64> {
    let n = adjacency.len();
    let mut bc = vec![0.0_f64; n];

    for s in 0..n {
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist = vec![-1i64; n];
        let mut delta = vec![0.0_f64; n];

        sigma[s] = 1.0;
        dist[s] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &(w, _) in &adjacency[v] {
                if dist[w] < 0 {
                    queue.push_back(w);
                    dist[w] = dist[v] + 1;
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                bc[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for b in bc.iter_mut() {
            *b *= scale;
        }
    }
    bc
}

/// Weighted PageRank; scores sum to 1. A self-loop's weight counts toward
/// its node's out-weight and flows back to the node.
pub fn pagerank(adjacency: &[Vec<(usize, f64)>], config: &PageRankConfig) -> Vec<f64> {
    let n = adjacency.len();
    if n == 0 {
        return Vec::new();
    }

    let d = config.damping_factor;
    let teleport = (1.0 - d) / n as f64;
    let out_weight: Vec<f64> = adjacency
        .iter()
        .map(|neighbors| neighbors.iter().map(|(_, w)| w).sum())
        .collect();

    let mut scores = vec![1.0 / n as f64; n];
    let mut new_scores = vec![0.0_f64; n];
    let mut converged = false;

    for _ in 0..config.max_iterations {
        let dangling: f64 = (0..n)
            .filter(|&u| out_weight[u] <= 0.0)
            .map(|u| scores[u])
            .sum();
        new_scores.fill(teleport + d * dangling / n as f64);

        for u in 0..n {
            if out_weight[u] > 0.0 {
                for &(v, w) in &adjacency[u] {
                    new_scores[v] += d * scores[u] * w / out_weight[u];
                }
            }
        }

        let diff: f64 = scores
            .iter()
            .zip(new_scores.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        std::mem::swap(&mut scores, &mut new_scores);

        if diff < n as f64 * config.tolerance {
            converged = true;
            break;
        }
    }
    if !converged {
        warn!(
            "PageRank did not converge within {} iterations",
            config.max_iterations
        );
    }

    let sum: f64 = scores.iter().sum();
    if sum > 0.0 {
        for s in &mut scores {
            *s /= sum;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooccurrence::TermPair;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn corpus(pairs: &[(&str, &str, f64)]) -> CorpusPairCounter {
        pairs
            .iter()
            .map(|(a, b, w)| (TermPair::new(*a, *b), *w))
            .collect()
    }

    #[test]
    fn top_n_keeps_strongest_pair_only() {
        let g = build_graph(&corpus(&[("a", "b", 5.0), ("c", "d", 1.0)]), 1).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.node("a").is_some());
        assert!(g.node("b").is_some());
        assert!(g.node("c").is_none());
        assert!(close(g.edges[0].weight, 5.0));
    }

    #[test]
    fn empty_corpus_is_insufficient() {
        let err = build_graph(&CorpusPairCounter::new(), 40).unwrap_err();
        assert!(matches!(err, MinerError::InsufficientCooccurrence));
    }

    #[test]
    fn self_pair_only_gives_single_node_loop() {
        let g = build_graph(&corpus(&[("テスト", "テスト", 0.63)]), 40).unwrap();
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges[0].source, g.edges[0].target);
        let node = g.node("テスト").unwrap();
        assert!(close(node.degree_centrality, 1.0));
        assert!(close(node.betweenness_centrality, 0.0));
        assert!(close(node.pagerank, 1.0));
    }

    #[test]
    fn heavy_self_pair_wins_top_n() {
        let g = build_graph(&corpus(&[("a", "a", 10.0), ("a", "b", 1.0)]), 1).unwrap();
        let terms: Vec<&str> = g.nodes.iter().map(|n| n.term.as_str()).collect();
        assert_eq!(terms, vec!["a"]);
        assert_eq!(g.edge_count(), 1);
        assert!(close(g.edges[0].weight, 10.0));
    }

    #[test]
    fn self_loop_counts_twice_in_degree() {
        // a has a loop plus an edge to b; n - 1 = 2.
        let g = build_graph(
            &corpus(&[("a", "a", 1.0), ("a", "b", 1.0), ("b", "c", 1.0)]),
            10,
        )
        .unwrap();
        assert!(close(g.node("a").unwrap().degree_centrality, 1.5));
        assert!(close(g.node("b").unwrap().degree_centrality, 1.0));
        // The loop does not change shortest paths.
        assert!(close(g.node("b").unwrap().betweenness_centrality, 1.0));
        assert!(close(g.node("a").unwrap().betweenness_centrality, 0.0));
        let total: f64 = g.nodes.iter().map(|n| n.pagerank).sum();
        assert!(close(total, 1.0));
    }

    #[test]
    fn star_graph_centrality() {
        let g = build_graph(
            &corpus(&[("hub", "x", 1.0), ("hub", "y", 1.0), ("hub", "z", 1.0)]),
            10,
        )
        .unwrap();
        let hub = g.node("hub").unwrap();
        let leaf = g.node("x").unwrap();
        assert!(close(hub.degree_centrality, 1.0));
        assert!(close(leaf.degree_centrality, 1.0 / 3.0));
        // The hub sits on all three leaf-to-leaf paths.
        assert!(close(hub.betweenness_centrality, 1.0));
        assert!(close(leaf.betweenness_centrality, 0.0));
        assert!(hub.pagerank > leaf.pagerank);
        let total: f64 = g.nodes.iter().map(|n| n.pagerank).sum();
        assert!(close(total, 1.0));
    }

    #[test]
    fn path_graph_betweenness() {
        // a - b - c - d
        let g = build_graph(
            &corpus(&[("a", "b", 1.0), ("b", "c", 1.0), ("c", "d", 1.0)]),
            10,
        )
        .unwrap();
        assert!(close(g.node("b").unwrap().betweenness_centrality, 2.0 / 3.0));
        assert!(close(g.node("a").unwrap().betweenness_centrality, 0.0));
    }

    #[test]
    fn pagerank_follows_weights() {
        let g = build_graph(
            &corpus(&[("a", "b", 10.0), ("a", "c", 1.0), ("b", "c", 1.0)]),
            10,
        )
        .unwrap();
        assert!(g.node("a").unwrap().pagerank > g.node("c").unwrap().pagerank);
        assert_eq!(g.ranked_nodes().last().unwrap().term, "c");
    }

    #[test]
    fn two_node_graph() {
        let g = build_graph(&corpus(&[("a", "b", 1.0)]), 10).unwrap();
        assert!(close(g.node("a").unwrap().degree_centrality, 1.0));
        assert!(close(g.node("a").unwrap().betweenness_centrality, 0.0));
        assert!(close(g.node("a").unwrap().pagerank, 0.5));
    }
}
