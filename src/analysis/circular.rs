use crate::analysis::ModuleGraph;
use crate::model::Violation;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Report every elementary cycle of the module relation exactly once.
///
/// Strongly connected components narrow the search; inside each component a
/// DFS from every module only walks modules ranked after it by name, so each
/// cycle is found once, starting at its lexicographically smallest module.
pub fn detect_cycles(graph: &ModuleGraph<'_>) -> Vec<Violation> {
    let pg = graph.graph();
    let name_of = |idx: NodeIndex| graph.modules()[pg[idx]].name();
    let mut violations = Vec::new();

    for scc in tarjan_scc(pg) {
        if scc.len() < 2 {
            continue;
        }

        let mut members = scc.clone();
        members.sort_by(|a, b| name_of(*a).cmp(name_of(*b)));
        let rank: HashMap<NodeIndex, usize> =
            members.iter().enumerate().map(|(r, &n)| (n, r)).collect();

        for &start in &members {
            let mut path = vec![start];
            walk(graph, start, start, &rank, &mut path, &mut |cycle| {
                let names: Vec<String> = cycle.iter().map(|&n| name_of(n).to_string()).collect();
                tracing::debug!(cycle = ?names, "module cycle detected");
                violations.push(Violation::cycle(names));
            });
        }
    }

    violations
}

fn walk(
    graph: &ModuleGraph<'_>,
    start: NodeIndex,
    current: NodeIndex,
    rank: &HashMap<NodeIndex, usize>,
    path: &mut Vec<NodeIndex>,
    found: &mut dyn FnMut(&[NodeIndex]),
) {
    let pg = graph.graph();
    let start_rank = rank[&start];

    let mut next: Vec<NodeIndex> = pg
        .neighbors_directed(current, Direction::Outgoing)
        .filter(|n| rank.contains_key(n))
        .collect();
    next.sort_by_key(|n| rank[n]);
    next.dedup();

    for neighbor in next {
        if neighbor == start {
            found(path);
        } else if rank[&neighbor] > start_rank && !path.contains(&neighbor) {
            path.push(neighbor);
            walk(graph, start, neighbor, rank, path, found);
            path.pop();
        }
    }
}
