use crate::analysis::{
    derived_sequence, AnalysisError, Cfg, DomTree, Graph, If, Interval, Loop, LoopType, Node,
    NodeArena, NodeId, Primitives, Switch,
};
use fnv::FnvHashSet;
use log::debug;

/// Analyzes the given control flow graph and recovers its control flow
/// primitives.
///
/// The passes run in a fixed order: switches first, then loops over the
/// whole derived sequence, then two-way conditionals. The graph itself is
/// never modified; all intermediate state lives in `nodes`, which must be the
/// arena the graph was built with. Annotations are expected to be empty, as
/// freshly built or after [NodeArena::clear_annotations].
///
/// On failure no partial result is returned.
pub fn analyze(graph: &Cfg, nodes: &mut NodeArena) -> Result<Primitives, AnalysisError> {
    let mut prims = Primitives::default();
    if graph.entry().is_none() {
        return Ok(prims);
    }
    graph.number_nodes(nodes);
    let dom = graph.dominators();
    struct_switch(graph, &dom, nodes, &mut prims)?;
    let (graphs, interval_sets) = derived_sequence(graph, nodes)?;
    struct_loop(&graphs, &interval_sets, graph.name(), nodes, &mut prims)?;
    struct_if(graph, &dom, nodes, &mut prims);
    Ok(prims)
}

// (pred, succ) is a back edge if succ was entered before pred during the
// depth-first walk. The caller accounts the edge on the successor.
fn is_back_edge(pred: &Node, succ: &Node) -> bool {
    pred.pre >= succ.pre
}

/// Structures the n-way conditionals of the graph.
///
/// Every node with more than two successors heads a switch. The follow is
/// the node immediately dominated by the header that is not one of the cases
/// and joins the most in-edges; the member walk claims nodes whose immediate
/// dominator has been claimed already, stopping at the follow and at nested
/// n-way headers.
fn struct_switch(
    graph: &Cfg,
    dom: &DomTree<NodeId>,
    nodes: &mut NodeArena,
    prims: &mut Primitives,
) -> Result<(), AnalysisError> {
    for head in graph.nodes_by_rev_post(nodes) {
        if graph.successors(head).len() <= 2 {
            continue;
        }
        let mut candidates = dom.dominated_by(head).to_vec();
        candidates.sort_by_key(|&id| (nodes[id].rev_post, id));
        let mut follow: Option<NodeId> = None;
        for candidate in candidates {
            if graph.successors(head).contains(&candidate) {
                continue;
            }
            match follow {
                Some(present)
                    if graph.predecessors(candidate).len()
                        <= graph.predecessors(present).len() => {}
                _ => follow = Some(candidate),
            }
        }
        let follow = follow.ok_or_else(|| AnalysisError::UnsupportedShape {
            graph: graph.name().to_string(),
            node: nodes[head].name.clone(),
            reason: format!(
                "{}-way header without a follow candidate",
                graph.successors(head).len()
            ),
        })?;
        debug!(
            "switch {}: follow {}",
            nodes[head].name, nodes[follow].name
        );
        nodes[head].switch_head = Some(head);
        nodes[head].switch_follow = Some(follow);
        let mut members = FnvHashSet::default();
        members.insert(head);
        let mut traversed = FnvHashSet::default();
        let mut cases = graph.successors(head).to_vec();
        cases.sort_by_key(|&id| (nodes[id].rev_post, id));
        for case in cases {
            flag_switch_nodes(graph, dom, head, follow, case, &mut members, &mut traversed, nodes);
        }
        nodes[follow].switch_head = Some(head);
        let mut listed = members.into_iter().collect::<Vec<_>>();
        listed.sort_by_key(|&id| (nodes[id].rev_post, id));
        prims.switches.push(Switch {
            head: nodes[head].name.clone(),
            follow: nodes[follow].name.clone(),
            nodes: listed.into_iter().map(|id| nodes[id].name.clone()).collect(),
        });
    }
    Ok(())
}

// recursively claims the nodes reachable from a case branch whose immediate
// dominator has been claimed already
fn flag_switch_nodes(
    graph: &Cfg,
    dom: &DomTree<NodeId>,
    head: NodeId,
    follow: NodeId,
    current: NodeId,
    members: &mut FnvHashSet<NodeId>,
    traversed: &mut FnvHashSet<NodeId>,
    nodes: &mut NodeArena,
) {
    traversed.insert(current);
    if current == follow {
        return;
    }
    if graph.successors(current).len() > 2 {
        // a nested n-way header ends the walk without being claimed
        return;
    }
    match dom.idom(current) {
        Some(idom) if members.contains(&idom) => {}
        _ => return,
    }
    members.insert(current);
    nodes[current].switch_head = Some(head);
    let mut succs = graph.successors(current).to_vec();
    succs.sort_by_key(|&id| (nodes[id].rev_post, id));
    for succ in succs {
        if traversed.contains(&succ) {
            continue;
        }
        flag_switch_nodes(graph, dom, head, follow, succ, members, traversed, nodes);
    }
}

/// Structures the loops of every graph in the derived sequence.
///
/// For each interval of each derived graph, the back edges entering the
/// interval header from inside the interval are counted; the one with the
/// greatest reverse post-order closes the loop and becomes its latch. A
/// latch sitting in the same switch as the header, or already claimed by
/// another loop, is skipped. Intervals are also recorded here, under the
/// name of the node they collapse into.
fn struct_loop(
    graphs: &[Cfg],
    interval_sets: &[Vec<Interval>],
    graph_name: &str,
    nodes: &mut NodeArena,
    prims: &mut Primitives,
) -> Result<(), AnalysisError> {
    for (level, graph) in graphs.iter().enumerate() {
        let dom = graph.dominators();
        let set = &interval_sets[level];
        let mut order = (0..set.len()).collect::<Vec<_>>();
        order.sort_by_key(|&position| (nodes[set[position].header()].rev_post, position));
        for position in order {
            let interval = &set[position];
            let header = interval.header();
            let interval_name = format!("G{}_I{}", level + 2, position + 1);
            let listed = interval
                .nodes_by_rev_post(nodes)
                .into_iter()
                .map(|id| nodes[id].name.clone())
                .collect::<Vec<_>>();
            if prims.intervals.insert(interval_name.clone(), listed).is_some() {
                return Err(AnalysisError::DuplicateInterval {
                    name: interval_name,
                });
            }
            // the latch is the back-edge predecessor with the greatest
            // reverse post-order
            let mut latch: Option<NodeId> = None;
            let mut preds = graph.predecessors(header).to_vec();
            preds.sort_by_key(|&id| (nodes[id].rev_post, id));
            for pred in preds {
                if !interval.contains(pred) {
                    continue;
                }
                if is_back_edge(&nodes[pred], &nodes[header]) {
                    nodes[header].n_back_edges += 1;
                    latch = match latch {
                        Some(found) if nodes[pred].rev_post <= nodes[found].rev_post => Some(found),
                        _ => Some(pred),
                    };
                }
            }
            let latch = match latch {
                Some(latch) => latch,
                None => continue,
            };
            debug!(
                "{}: latch {} for header {}",
                graph.name(),
                nodes[latch].name,
                nodes[header].name
            );
            // a latch inside the same switch as the header is a multi-way
            // case, not a loop
            if nodes[latch].switch_head.is_some()
                && nodes[latch].switch_head == nodes[header].switch_head
            {
                continue;
            }
            if nodes[latch].loop_head.is_some() {
                continue;
            }
            nodes[header].latch = Some(latch);
            let primitive = find_nodes_in_loop(graph, graph_name, interval, latch, &dom, nodes)?;
            prims.loops.push(primitive);
            nodes[latch].is_latch = true;
        }
    }
    Ok(())
}

// Locates the nodes of the loop closed by (latch, header) and classifies the
// loop, filling the header annotations and building its primitive record.
fn find_nodes_in_loop(
    graph: &Cfg,
    graph_name: &str,
    interval: &Interval,
    latch: NodeId,
    dom: &DomTree<NodeId>,
    nodes: &mut NodeArena,
) -> Result<Loop, AnalysisError> {
    let header = interval.header();
    nodes[header].loop_head = Some(header);
    let mut in_loop = FnvHashSet::default();
    in_loop.insert(header);
    for node in interval.nodes_by_rev_post(nodes) {
        if node == header {
            continue;
        }
        if node == latch {
            break;
        }
        match dom.idom(node) {
            Some(idom) if in_loop.contains(&idom) => {
                in_loop.insert(node);
                if nodes[node].loop_head.is_none() {
                    nodes[node].loop_head = Some(header);
                }
            }
            _ => {}
        }
    }
    nodes[latch].loop_head = Some(header);
    in_loop.insert(latch);

    let head_succs = graph.successors(header).to_vec();
    let latch_succs = graph.successors(latch);
    let loop_type;
    let mut loop_follow = None;
    match latch_succs.len() {
        // the latch holds an exit test
        2 => {
            let latch_false = latch_succs[0];
            let latch_true = latch_succs[1];
            let latch_exit = if latch_true == header {
                latch_false
            } else {
                latch_true
            };
            if head_succs.len() == 2 || latch == header {
                if latch == header
                    || (in_loop.contains(&head_succs[0]) && in_loop.contains(&head_succs[1]))
                {
                    loop_type = LoopType::PostTest;
                    loop_follow = Some(latch_exit);
                } else {
                    // the header tests the exit instead
                    loop_type = LoopType::PreTest;
                    loop_follow = Some(if in_loop.contains(&head_succs[1]) {
                        head_succs[0]
                    } else {
                        head_succs[1]
                    });
                }
            } else {
                loop_type = LoopType::PostTest;
                loop_follow = Some(latch_exit);
            }
        }
        // the latch falls straight back to the header
        1 => {
            if head_succs.len() == 2 {
                let head_false = head_succs[0];
                let head_true = head_succs[1];
                let mut current = latch;
                let mut endless = false;
                loop {
                    if current == head_true {
                        loop_follow = Some(head_false);
                        break;
                    }
                    if current == head_false {
                        loop_follow = Some(head_true);
                        break;
                    }
                    // a walk falling back to the header or beyond means a
                    // strangely formed loop; treat it as endless
                    if nodes[current].rev_post <= nodes[header].rev_post {
                        endless = true;
                        break;
                    }
                    match dom.idom(current) {
                        Some(idom) => current = idom,
                        None => {
                            endless = true;
                            break;
                        }
                    }
                }
                loop_type = if endless {
                    LoopType::Endless
                } else {
                    LoopType::PreTest
                };
                // a follow found past the header belongs to an outer context
                if nodes[current].rev_post > nodes[header].rev_post {
                    if let Some(follow) = loop_follow {
                        nodes[follow].loop_head = None;
                    }
                }
            } else {
                loop_type = LoopType::Endless;
            }
        }
        out_degree => {
            return Err(AnalysisError::UnsupportedShape {
                graph: graph_name.to_string(),
                node: nodes[latch].name.clone(),
                reason: format!("latch with {} successors", out_degree),
            });
        }
    }
    nodes[header].loop_type = Some(loop_type);
    nodes[header].loop_follow = loop_follow;

    let mut listed = in_loop.into_iter().collect::<Vec<_>>();
    listed.sort_by_key(|&id| (nodes[id].rev_post, id));
    Ok(Loop {
        loop_type,
        head: nodes[header].name.clone(),
        latch: nodes[latch].name.clone(),
        follow: loop_follow.map_or_else(String::new, |id| nodes[id].name.clone()),
        nodes: listed.into_iter().map(|id| nodes[id].name.clone()).collect(),
    })
}

/// Structures the two-way conditionals of the graph.
///
/// Conditionals are visited in post-order so that nested constructs are
/// resolved before the enclosing ones. A conditional accepts as follow the
/// node it immediately dominates with the most incoming edges, not counting
/// back edges; a genuine merge point has at least two of them. Conditionals
/// without one are deferred and attached to the follow of the next enclosing
/// conditional that finds one.
fn struct_if(graph: &Cfg, dom: &DomTree<NodeId>, nodes: &mut NodeArena, prims: &mut Primitives) {
    let mut unresolved: Vec<NodeId> = Vec::new();
    let mut order = graph.nodes_by_rev_post(nodes);
    order.reverse();
    for cond in order {
        if graph.successors(cond).len() != 2 || nodes[cond].loop_head.is_some() {
            continue;
        }
        let mut candidates = dom.dominated_by(cond).to_vec();
        candidates.sort_by_key(|&id| (nodes[id].rev_post, id));
        let mut follow: Option<NodeId> = None;
        let mut follow_in_edges = 0;
        for candidate in candidates {
            let in_edges = graph
                .predecessors(candidate)
                .len()
                .saturating_sub(nodes[candidate].n_back_edges);
            if in_edges > follow_in_edges {
                follow = Some(candidate);
                follow_in_edges = in_edges;
            }
        }
        match follow {
            Some(follow) if follow_in_edges > 1 => {
                debug!("follow of {}: {}", nodes[cond].name, nodes[follow].name);
                nodes[cond].if_follow = Some(follow);
                let mut drained = Vec::with_capacity(unresolved.len());
                for deferred in unresolved.drain(..) {
                    nodes[deferred].if_follow = Some(follow);
                    drained.push(nodes[deferred].name.clone());
                }
                prims.ifs.push(If {
                    cond: nodes[cond].name.clone(),
                    follow: nodes[follow].name.clone(),
                    unresolved: drained,
                });
            }
            _ => unresolved.push(cond),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::{analyze, AnalysisError, Cfg, LoopType};
    use maplit::btreemap;

    #[test]
    fn analyze_empty() {
        let (graph, mut arena) = Cfg::new("empty", &[], &[]);
        let prims = analyze(&graph, &mut arena).unwrap();
        assert!(prims.intervals.is_empty());
        assert!(prims.switches.is_empty());
        assert!(prims.loops.is_empty());
        assert!(prims.ifs.is_empty());
    }

    #[test]
    fn pretest_loop() {
        let (graph, mut arena) = Cfg::new(
            "pretest",
            &["h", "body", "follow"],
            &[("h", "body"), ("h", "follow"), ("body", "h")],
        );
        let prims = analyze(&graph, &mut arena).unwrap();
        assert_eq!(prims.loops.len(), 1);
        let found = &prims.loops[0];
        assert_eq!(found.loop_type, LoopType::PreTest);
        assert_eq!(found.head, "h");
        assert_eq!(found.latch, "body");
        assert_eq!(found.follow, "follow");
        // the loop body does not claim the follow node
        assert!(arena[2].loop_head.is_none());
        assert!(arena[1].is_latch);
    }

    #[test]
    fn posttest_loop() {
        let (graph, mut arena) = Cfg::new(
            "posttest",
            &["h", "body", "follow"],
            &[("h", "body"), ("body", "h"), ("body", "follow")],
        );
        let prims = analyze(&graph, &mut arena).unwrap();
        assert_eq!(prims.loops.len(), 1);
        let found = &prims.loops[0];
        assert_eq!(found.loop_type, LoopType::PostTest);
        assert_eq!(found.head, "h");
        assert_eq!(found.latch, "body");
        assert_eq!(found.follow, "follow");
        assert_eq!(found.nodes, vec!["h", "body"]);
    }

    #[test]
    fn endless_loop() {
        let (graph, mut arena) =
            Cfg::new("endless", &["h", "b"], &[("h", "b"), ("b", "h")]);
        let prims = analyze(&graph, &mut arena).unwrap();
        assert_eq!(prims.loops.len(), 1);
        let found = &prims.loops[0];
        assert_eq!(found.loop_type, LoopType::Endless);
        assert_eq!(found.head, "h");
        assert_eq!(found.latch, "b");
        assert_eq!(found.follow, "");
        assert_eq!(found.nodes, vec!["h", "b"]);
    }

    #[test]
    fn if_with_merge() {
        let (graph, mut arena) = Cfg::new(
            "diamond",
            &["c", "t", "f", "m"],
            &[("c", "t"), ("c", "f"), ("t", "m"), ("f", "m")],
        );
        let prims = analyze(&graph, &mut arena).unwrap();
        assert!(prims.loops.is_empty());
        assert_eq!(prims.ifs.len(), 1);
        let found = &prims.ifs[0];
        assert_eq!(found.cond, "c");
        assert_eq!(found.follow, "m");
        assert!(found.unresolved.is_empty());
    }

    #[test]
    fn nested_ifs_inner_first() {
        let (graph, mut arena) = Cfg::new(
            "nested_ifs",
            &["a", "b", "c", "d", "e", "j", "m"],
            &[
                ("a", "b"),
                ("a", "c"),
                ("b", "d"),
                ("b", "e"),
                ("d", "j"),
                ("e", "j"),
                ("j", "m"),
                ("c", "m"),
            ],
        );
        let prims = analyze(&graph, &mut arena).unwrap();
        assert_eq!(prims.ifs.len(), 2);
        assert_eq!(prims.ifs[0].cond, "b");
        assert_eq!(prims.ifs[0].follow, "j");
        assert_eq!(prims.ifs[1].cond, "a");
        assert_eq!(prims.ifs[1].follow, "m");
        assert!(prims.ifs[0].unresolved.is_empty());
        assert!(prims.ifs[1].unresolved.is_empty());
    }

    #[test]
    fn if_without_merge_drains_into_enclosing() {
        // the inner conditional shares the merge of the outer one, so it has
        // no follow of its own and is drained when the outer one is resolved
        let (graph, mut arena) = Cfg::new(
            "shared_merge",
            &["a", "b", "c", "d", "e", "m"],
            &[
                ("a", "b"),
                ("a", "c"),
                ("b", "d"),
                ("b", "e"),
                ("d", "m"),
                ("e", "m"),
                ("c", "m"),
            ],
        );
        let prims = analyze(&graph, &mut arena).unwrap();
        assert_eq!(prims.ifs.len(), 1);
        let found = &prims.ifs[0];
        assert_eq!(found.cond, "a");
        assert_eq!(found.follow, "m");
        assert_eq!(found.unresolved, vec!["b"]);
        // the deferred conditional received the same follow
        assert_eq!(arena[1].if_follow, Some(5));
    }

    #[test]
    fn switch_with_follow() {
        let (graph, mut arena) = Cfg::new(
            "switching",
            &["s", "a", "b", "c", "f"],
            &[
                ("s", "a"),
                ("s", "b"),
                ("s", "c"),
                ("a", "f"),
                ("b", "f"),
                ("c", "f"),
            ],
        );
        let prims = analyze(&graph, &mut arena).unwrap();
        assert_eq!(prims.switches.len(), 1);
        let found = &prims.switches[0];
        assert_eq!(found.head, "s");
        assert_eq!(found.follow, "f");
        assert_eq!(found.nodes, vec!["s", "c", "b", "a"]);
        assert_eq!(arena[0].switch_follow, Some(4));
        for id in 0..5 {
            assert_eq!(arena[id].switch_head, Some(0));
        }
    }

    #[test]
    fn switch_without_follow_fails() {
        let (graph, mut arena) = Cfg::new(
            "broken_switch",
            &["s", "a", "b", "c"],
            &[("s", "a"), ("s", "b"), ("s", "c")],
        );
        let err = analyze(&graph, &mut arena).unwrap_err();
        match err {
            AnalysisError::UnsupportedShape { graph, node, .. } => {
                assert_eq!(graph, "broken_switch");
                assert_eq!(node, "s");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn latch_inside_switch_is_not_a_loop() {
        let (graph, mut arena) = Cfg::new(
            "case_latch",
            &["s", "a", "b", "c", "f"],
            &[
                ("s", "a"),
                ("s", "b"),
                ("s", "c"),
                ("a", "f"),
                ("b", "f"),
                ("c", "f"),
                ("c", "s"),
            ],
        );
        let prims = analyze(&graph, &mut arena).unwrap();
        assert_eq!(prims.switches.len(), 1);
        assert!(prims.loops.is_empty());
    }

    #[test]
    fn latch_with_three_successors_fails() {
        let (graph, mut arena) = Cfg::new(
            "wide_latch",
            &["h", "b", "x", "y", "z"],
            &[
                ("h", "b"),
                ("b", "h"),
                ("b", "x"),
                ("b", "y"),
                ("x", "z"),
                ("y", "z"),
            ],
        );
        let err = analyze(&graph, &mut arena).unwrap_err();
        match err {
            AnalysisError::UnsupportedShape { node, reason, .. } => {
                assert_eq!(node, "b");
                assert!(reason.contains("3 successors"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn analyze_nested_loops() {
        let (graph, mut arena) = Cfg::new(
            "nested",
            &["1", "2", "3", "4", "5", "6", "7", "8"],
            &[
                ("1", "2"),
                ("2", "3"),
                ("3", "4"),
                ("4", "3"),
                ("4", "5"),
                ("5", "6"),
                ("6", "5"),
                ("6", "7"),
                ("7", "2"),
                ("7", "8"),
            ],
        );
        let prims = analyze(&graph, &mut arena).unwrap();
        let strings = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            prims.intervals,
            btreemap! {
                "G2_I1".to_string() => strings(&["1"]),
                "G2_I2".to_string() => strings(&["2"]),
                "G2_I3".to_string() => strings(&["3", "4"]),
                "G2_I4".to_string() => strings(&["5", "6", "7", "8"]),
                "G3_I1".to_string() => strings(&["G2_I1"]),
                "G3_I2".to_string() => strings(&["G2_I2", "G2_I3", "G2_I4"]),
                "G4_I1".to_string() => strings(&["G3_I1", "G3_I2"]),
                "G5_I1".to_string() => strings(&["G4_I1"]),
            }
        );
        assert_eq!(prims.loops.len(), 3);
        assert_eq!(prims.loops[0].loop_type, LoopType::PostTest);
        assert_eq!(prims.loops[0].head, "3");
        assert_eq!(prims.loops[0].latch, "4");
        assert_eq!(prims.loops[0].follow, "5");
        assert_eq!(prims.loops[0].nodes, vec!["3", "4"]);
        assert_eq!(prims.loops[1].loop_type, LoopType::PostTest);
        assert_eq!(prims.loops[1].head, "5");
        assert_eq!(prims.loops[1].latch, "6");
        assert_eq!(prims.loops[1].follow, "7");
        assert_eq!(prims.loops[1].nodes, vec!["5", "6"]);
        assert_eq!(prims.loops[2].loop_type, LoopType::Endless);
        assert_eq!(prims.loops[2].head, "G2_I2");
        assert_eq!(prims.loops[2].latch, "G2_I4");
        assert_eq!(prims.loops[2].follow, "");
        assert_eq!(
            prims.loops[2].nodes,
            vec!["G2_I2", "G2_I3", "G2_I4"]
        );
        assert!(prims.switches.is_empty());
        assert!(prims.ifs.is_empty());
        // back edges were accounted on the headers of the inner loops
        assert_eq!(arena[2].n_back_edges, 1);
        assert_eq!(arena[4].n_back_edges, 1);
        assert_eq!(arena[1].n_back_edges, 0);
    }

    #[test]
    fn analyze_is_deterministic_and_repeatable() {
        let build = || {
            Cfg::new(
                "repeat",
                &["1", "2", "3", "4", "5", "6", "7", "8"],
                &[
                    ("1", "2"),
                    ("2", "3"),
                    ("3", "4"),
                    ("4", "3"),
                    ("4", "5"),
                    ("5", "6"),
                    ("6", "5"),
                    ("6", "7"),
                    ("7", "2"),
                    ("7", "8"),
                ],
            )
        };
        let (graph, mut arena) = build();
        let first = analyze(&graph, &mut arena).unwrap();
        // same graph, fresh arena
        let (other_graph, mut other_arena) = build();
        let second = analyze(&other_graph, &mut other_arena).unwrap();
        assert_eq!(first, second);
        // same graph, same arena, cleared annotations
        arena.clear_annotations();
        let third = analyze(&graph, &mut arena).unwrap();
        assert_eq!(first, third);
    }
}
