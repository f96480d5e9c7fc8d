//! DependencyGraph: builds a DAG of rules from their input/output attribute
//! paths, rejects self-referencing or multiply-produced paths, detects
//! cycles, and answers query-based rule selection in topological order.
//!
//! Rules are stored in an arena (`nodes: Vec<R>`) addressed by `usize`
//! index rather than by id — adjacency and the query indices are then
//! plain `Vec`/`HashMap` over indices instead of a graph of owned/shared
//! rule references.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::GraphError;
use crate::rule::{distinct_tags, Query, QueryKind, Rule};

/// Direction for `DependencyGraph::topological_order`. `Dsc` is what
/// `select` uses: producers before consumers. `Asc` is its mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Dsc,
}

pub struct DependencyGraph<R: Rule> {
    nodes: Vec<R>,
    /// producer index -> consumer indices, insertion order, deduplicated.
    adjacency: Vec<Vec<usize>>,
    /// consumer index -> producer indices, insertion order, deduplicated.
    reverse_adjacency: Vec<Vec<usize>>,
    by_query: HashMap<Query, Vec<usize>>,
}

impl<R: Rule> DependencyGraph<R> {
    /// Build a graph from an owned rule set. Node index == position in
    /// `rules`, which becomes each node's stable, insertion-order identity.
    pub fn build(rules: Vec<R>) -> Result<Self, GraphError> {
        let n = rules.len();

        for rule in &rules {
            if let Some(path) = rule.inputs().iter().find(|p| rule.outputs().contains(p)) {
                return Err(GraphError::SameOutputAsInput {
                    rule_id: rule.id().to_string(),
                    path: path.clone(),
                });
            }
        }

        let mut output_owner: HashMap<String, usize> = HashMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            for path in rule.outputs() {
                if let Some(&existing) = output_owner.get(path) {
                    return Err(GraphError::MultipleProducers {
                        path: path.clone(),
                        first_rule_id: rules[existing].id().to_string(),
                        second_rule_id: rule.id().to_string(),
                    });
                }
                output_owner.insert(path.clone(), idx);
            }
        }

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut reverse_adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (idx, rule) in rules.iter().enumerate() {
            let mut seen_producers = HashSet::new();
            for path in rule.inputs() {
                if let Some(&producer_idx) = output_owner.get(path) {
                    if seen_producers.insert(producer_idx) {
                        adjacency[producer_idx].push(idx);
                        reverse_adjacency[idx].push(producer_idx);
                    }
                }
            }
        }

        let sorted_all = kahn_forward_all(&reverse_adjacency, &adjacency);
        if sorted_all.len() < n {
            let included: HashSet<usize> = sorted_all.into_iter().collect();
            let cycle_rule_ids = (0..n)
                .filter(|i| !included.contains(i))
                .map(|i| rules[i].id().to_string())
                .collect();
            return Err(GraphError::GraphContainsCycle { cycle_rule_ids });
        }

        let mut by_query: HashMap<Query, Vec<usize>> = HashMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            by_query
                .entry(Query {
                    key: rule.rule_type().to_string(),
                    kind: QueryKind::RuleType,
                })
                .or_default()
                .push(idx);
            for path in rule.outputs() {
                by_query
                    .entry(Query {
                        key: path.clone(),
                        kind: QueryKind::AttributePath,
                    })
                    .or_default()
                    .push(idx);
            }
            for tag in distinct_tags(rule.tags()) {
                by_query
                    .entry(Query {
                        key: tag.to_string(),
                        kind: QueryKind::AttributeTag,
                    })
                    .or_default()
                    .push(idx);
            }
        }

        Ok(DependencyGraph {
            nodes: rules,
            adjacency,
            reverse_adjacency,
            by_query,
        })
    }

    pub fn rule(&self, idx: usize) -> &R {
        &self.nodes[idx]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node indices matching `query`, in rule-insertion order.
    pub fn nodes_for_query(&self, query: &Query) -> &[usize] {
        self.by_query.get(query).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Union of `nodes_for_query` across `queries`, topologically sorted in
    /// `Dsc` order (producers before consumers), including every rule that
    /// transitively produces an input the selected rules need. Duplicates
    /// across queries are emitted once; relative order is stable.
    pub fn select(&self, queries: &[Query]) -> Vec<&R> {
        self.select_indices(queries)
            .into_iter()
            .map(|idx| &self.nodes[idx])
            .collect()
    }

    /// Same as `select`, but returns node indices rather than rule
    /// references, so callers (the query cache) can store the result
    /// independent of the graph's own lifetime.
    pub fn select_indices(&self, queries: &[Query]) -> Vec<usize> {
        let mut start = Vec::new();
        let mut seen = HashSet::new();
        for query in queries {
            for &idx in self.nodes_for_query(query) {
                if seen.insert(idx) {
                    start.push(idx);
                }
            }
        }
        self.topological_order(&start, SortDirection::Dsc)
    }

    /// Topologically sort the sub-DAG reachable from `start` by walking
    /// transitively through producer edges (so the result includes every
    /// rule that `start` depends on, not just `start` itself), seeded from
    /// `start`. `Dsc` yields producers-before-consumers; `Asc` is the
    /// mirror. Ties break on node-insertion order (stable).
    pub fn topological_order(&self, start: &[usize], direction: SortDirection) -> Vec<usize> {
        let closure = self.ancestor_closure(start);
        let producer_first = kahn_forward_within(&closure, &self.reverse_adjacency, &self.adjacency);
        match direction {
            SortDirection::Dsc => producer_first,
            SortDirection::Asc => {
                let mut reversed = producer_first;
                reversed.reverse();
                reversed
            }
        }
    }

    /// `start` plus every node transitively reachable by walking backward
    /// along producer edges (i.e. every rule that produces something a
    /// start node, directly or indirectly, reads).
    fn ancestor_closure(&self, start: &[usize]) -> HashSet<usize> {
        let mut closure: HashSet<usize> = HashSet::new();
        let mut queue: VecDeque<usize> = VecDeque::new();
        for &idx in start {
            if closure.insert(idx) {
                queue.push_back(idx);
            }
        }
        while let Some(idx) = queue.pop_front() {
            for &producer in &self.reverse_adjacency[idx] {
                if closure.insert(producer) {
                    queue.push_back(producer);
                }
            }
        }
        closure
    }
}

/// Kahn's algorithm over the full node set (used only for cycle detection
/// at build time): nodes with in-degree zero enqueue first, ties broken by
/// ascending index.
fn kahn_forward_all(reverse_adjacency: &[Vec<usize>], adjacency: &[Vec<usize>]) -> Vec<usize> {
    let n = reverse_adjacency.len();
    let mut in_degree: Vec<usize> = reverse_adjacency.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut out = Vec::with_capacity(n);
    while let Some(idx) = queue.pop_front() {
        out.push(idx);
        for &consumer in &adjacency[idx] {
            in_degree[consumer] -= 1;
            if in_degree[consumer] == 0 {
                queue.push_back(consumer);
            }
        }
    }
    out
}

/// Kahn's algorithm restricted to `closure`: in-degree only counts edges
/// whose producer is also in `closure`, so selection reflects only the
/// sub-DAG reachable from the chosen seeds, not the whole graph.
fn kahn_forward_within(
    closure: &HashSet<usize>,
    reverse_adjacency: &[Vec<usize>],
    adjacency: &[Vec<usize>],
) -> Vec<usize> {
    let mut ordered: Vec<usize> = closure.iter().copied().collect();
    ordered.sort_unstable();

    let mut in_degree: HashMap<usize, usize> = HashMap::new();
    for &idx in &ordered {
        let count = reverse_adjacency[idx].iter().filter(|p| closure.contains(p)).count();
        in_degree.insert(idx, count);
    }

    let mut queue: VecDeque<usize> = ordered.iter().copied().filter(|i| in_degree[i] == 0).collect();
    let mut out = Vec::with_capacity(ordered.len());
    while let Some(idx) = queue.pop_front() {
        out.push(idx);
        for &consumer in &adjacency[idx] {
            if !closure.contains(&consumer) {
                continue;
            }
            let degree = in_degree.get_mut(&consumer).expect("consumer in closure");
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(consumer);
            }
        }
    }
    out
}
