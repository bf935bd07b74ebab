use crate::analysis::{intervals, AnalysisError, Cfg, Graph, Interval, NodeArena};
use log::debug;

/// Builds the derived sequence of graphs G1...Gn of a control flow graph,
/// together with the interval sets of each graph.
///
/// Each graph of the sequence is obtained by collapsing every interval of
/// the previous one into a single node named `G{i+1}_I{j}`, where `i` is the
/// level of the previous graph and `j` the 1-based position of the interval.
/// The sequence ends at the limit flow graph, the first graph that collapsing
/// does not shrink. The collapsed node inherits the switch header annotation
/// of the interval header.
///
/// The input graph is renamed "G1" and renumbered; every later graph is
/// numbered right after its construction.
pub fn derived_sequence(
    graph: &Cfg,
    nodes: &mut NodeArena,
) -> Result<(Vec<Cfg>, Vec<Vec<Interval>>), AnalysisError> {
    let mut first = graph.clone();
    first.set_name("G1");
    first.number_nodes(nodes);
    // a strictly shrinking sequence can never outgrow the node count
    let bound = first.len().max(1);
    let intervals_of_first = intervals(&first, nodes);
    let mut graphs = vec![first];
    let mut interval_sets = vec![intervals_of_first];
    loop {
        let level = graphs.len();
        if level > bound {
            return Err(AnalysisError::NonTerminating {
                graph: graph.name().to_string(),
                bound,
            });
        }
        let previous = &graphs[level - 1];
        let mut next = previous.clone();
        for (position, interval) in interval_sets[level - 1].iter().enumerate() {
            let new_name = format!("G{}_I{}", level + 1, position + 1);
            let (collapsed, new_id) = next.merge(interval.node_set(), &new_name, nodes);
            nodes[new_id].switch_head = nodes[interval.header()].switch_head;
            next = collapsed;
        }
        next.set_name(format!("G{}", level + 1));
        if next.len() == graphs[level - 1].len() {
            break;
        }
        next.number_nodes(nodes);
        let next_intervals = intervals(&next, nodes);
        debug!("derived {}: {} intervals", next, next_intervals.len());
        graphs.push(next);
        interval_sets.push(next_intervals);
    }
    Ok((graphs, interval_sets))
}
