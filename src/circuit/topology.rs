//! Topology discovery: junctions, branches, dead ends and independent loops.
//!
//! Analysis never mutates the circuit. Each pass works on a [`View`], which
//! is the circuit seen through a mask of active components. Removing a
//! component from a view clears its bit; incidence lists are filtered by the
//! mask, so connection order (and with it every tie-break) matches the
//! circuit's own insertion order.

use super::graph::Circuit;
use super::types::{BranchId, BranchLabel, ComponentId, TerminalId};
use crate::components::Component;

/// Branch assignment and current direction of one component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentLabel {
    pub branch: BranchLabel,
    /// End toward which the branch current is defined to flow
    pub direction: Option<TerminalId>,
}

/// Result of topology discovery.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Junctions of the pruned network, in row-major order
    pub nodes: Vec<TerminalId>,
    /// Labels indexed by component id
    pub labels: Vec<ComponentLabel>,
    /// Independent loops as component sequences, each closed end to start
    pub loops: Vec<Vec<ComponentId>>,
    /// Components stripped as dead ends, in removal order
    pub dead_ends: Vec<ComponentId>,
    /// Independent current variables in the pruned network
    pub num_branches: usize,
    /// Membership mask of the pruned network, indexed by component id
    core: Vec<bool>,
}

impl Topology {
    /// Analyse every component of the circuit.
    pub fn discover(circuit: &Circuit) -> Self {
        Self::discover_filtered(circuit, |_| true)
    }

    /// Analyse the sub-network of components accepted by `include`.
    pub fn discover_filtered(circuit: &Circuit, include: impl Fn(&Component) -> bool) -> Self {
        let base = View::new(circuit, include);

        let first_nodes = base.find_nodes();
        let first = label_branches(&base, &first_nodes);
        let mut labels = first.labels;
        if first.num_branches == 0 {
            return Self::incomplete(labels);
        }

        // Strip dangling components until only loop-bearing structure is left.
        let mut core = base.clone();
        let mut dead_ends = Vec::new();
        while let Some(dangler) = core.remove_dangler() {
            labels[dangler.0] = ComponentLabel {
                branch: BranchLabel::DeadEnd,
                direction: None,
            };
            dead_ends.push(dangler);
        }

        let nodes = core.find_nodes();
        let pruned = label_branches(&core, &nodes);
        for id in core.active_ids() {
            labels[id.0] = pruned.labels[id.0];
        }

        let loops = find_loops(core.clone());
        tracing::trace!(?loops, "independent loops");

        Self {
            nodes,
            labels,
            loops,
            dead_ends,
            num_branches: pruned.num_branches,
            core: core.active,
        }
    }

    fn incomplete(labels: Vec<ComponentLabel>) -> Self {
        let core = vec![false; labels.len()];
        Self {
            nodes: Vec::new(),
            labels,
            loops: Vec::new(),
            dead_ends: Vec::new(),
            num_branches: 0,
            core,
        }
    }

    /// True if at least one complete branch was found.
    pub fn is_complete(&self) -> bool {
        self.num_branches > 0
    }

    /// Label of a component, or the default for ids outside the analysis.
    pub fn label(&self, id: ComponentId) -> ComponentLabel {
        self.labels.get(id.0).copied().unwrap_or_default()
    }

    /// True if the component survived dead-end pruning.
    pub fn in_core(&self, id: ComponentId) -> bool {
        self.core.get(id.0).copied().unwrap_or(false)
    }

    /// Components of the pruned network incident to `terminal`, in
    /// connection order.
    pub fn core_connections<'a>(
        &'a self,
        circuit: &'a Circuit,
        terminal: TerminalId,
    ) -> impl Iterator<Item = ComponentId> + 'a {
        circuit
            .terminal(terminal)
            .map(|t| t.connections())
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(move |id| self.in_core(*id))
    }
}

/// The circuit restricted to a set of active components.
///
/// Terminal degrees are kept up to date as components are removed, so
/// degree and junction queries are constant time.
#[derive(Clone)]
struct View<'a> {
    circuit: &'a Circuit,
    active: Vec<bool>,
    /// Active incident components per terminal, row-major
    degrees: Vec<usize>,
    count: usize,
}

impl<'a> View<'a> {
    fn new(circuit: &'a Circuit, include: impl Fn(&Component) -> bool) -> Self {
        let mut view = Self {
            circuit,
            active: vec![false; circuit.slot_count()],
            degrees: vec![0; circuit.rows() * circuit.cols()],
            count: 0,
        };
        for c in circuit.components().filter(|c| include(c)) {
            view.active[c.id.0] = true;
            view.count += 1;
            for end in c.ends {
                if let Some(i) = circuit.terminal_index(end) {
                    view.degrees[i] += 1;
                }
            }
        }
        view
    }

    fn is_active(&self, id: ComponentId) -> bool {
        self.active.get(id.0).copied().unwrap_or(false)
    }

    fn component(&self, id: ComponentId) -> Option<&'a Component> {
        self.circuit.component(id)
    }

    /// Active components in insertion order.
    fn active_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.circuit.components().map(|c| c.id).filter(|id| self.is_active(*id))
    }

    fn first_active(&self) -> Option<ComponentId> {
        self.active_ids().next()
    }

    fn active_count(&self) -> usize {
        self.count
    }

    /// Active components incident to a terminal, in connection order.
    fn incident(&self, terminal: TerminalId) -> impl Iterator<Item = ComponentId> + '_ {
        self.circuit
            .terminal(terminal)
            .map(|t| t.connections())
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|id| self.is_active(*id))
    }

    fn degree(&self, terminal: TerminalId) -> usize {
        self.circuit
            .terminal_index(terminal)
            .and_then(|i| self.degrees.get(i).copied())
            .unwrap_or(0)
    }

    /// Three or more active connections.
    fn is_junction(&self, terminal: TerminalId) -> bool {
        self.degree(terminal) > 2
    }

    /// The first incident component other than `from`.
    fn next_component(&self, terminal: TerminalId, from: ComponentId) -> Option<ComponentId> {
        self.incident(terminal).find(|id| *id != from)
    }

    fn remove(&mut self, id: ComponentId) {
        let Some(bit) = self.active.get_mut(id.0) else {
            return;
        };
        if !std::mem::replace(bit, false) {
            return;
        }
        self.count -= 1;
        if let Some(c) = self.circuit.component(id) {
            for end in c.ends {
                if let Some(i) = self.circuit.terminal_index(end) {
                    self.degrees[i] -= 1;
                }
            }
        }
    }

    /// Junctions in row-major order.
    fn find_nodes(&self) -> Vec<TerminalId> {
        self.circuit
            .terminals()
            .map(|t| t.id)
            .filter(|t| self.is_junction(*t))
            .collect()
    }

    /// Remove the last active component with an end of degree one.
    fn remove_dangler(&mut self) -> Option<ComponentId> {
        let dangler = (0..self.active.len()).rev().map(ComponentId).find(|id| {
            self.is_active(*id)
                && self
                    .component(*id)
                    .is_some_and(|c| self.degree(c.ends[0]) == 1 || self.degree(c.ends[1]) == 1)
        })?;
        self.remove(dangler);
        Some(dangler)
    }

    fn strip_danglers(&mut self) {
        while self.remove_dangler().is_some() {}
    }
}

struct Labeling {
    labels: Vec<ComponentLabel>,
    num_branches: usize,
}

/// Assign a branch and current direction to every active component.
///
/// Branches are walked outward from each junction in node order and
/// connection order. A walk that reaches a terminal with fewer than two
/// connections is a dead end: its components are marked [`BranchLabel::DeadEnd`]
/// and the branch number is reused. Without junctions the network is walked
/// as a single loop; hitting a dead end then means there is no complete
/// circuit and `num_branches` is zero.
fn label_branches(view: &View<'_>, nodes: &[TerminalId]) -> Labeling {
    let mut labels = vec![ComponentLabel::default(); view.active.len()];
    let Some(first) = view.first_active() else {
        return Labeling { labels, num_branches: 0 };
    };

    let num_branches = if nodes.is_empty() {
        if !walk_single_loop(view, first, &mut labels) {
            return Labeling { labels, num_branches: 0 };
        }
        1
    } else {
        let mut branch = 0;
        for &node in nodes {
            let connections: Vec<ComponentId> = view.incident(node).collect();
            for start in connections {
                if labels[start.0].branch != BranchLabel::Unassigned {
                    continue;
                }
                if walk_branch(view, node, start, BranchId(branch), &mut labels) {
                    branch += 1;
                }
            }
        }
        branch
    };

    // Anything never reached is not attached to the main circuit.
    for id in view.active_ids() {
        if labels[id.0].branch == BranchLabel::Unassigned {
            labels[id.0].branch = BranchLabel::DeadEnd;
        }
    }

    Labeling { labels, num_branches }
}

/// Walk one junction-free loop, labelling it branch 0.
///
/// Returns false if the walk reaches a dead end.
fn walk_single_loop(view: &View<'_>, first: ComponentId, labels: &mut [ComponentLabel]) -> bool {
    let Some(component) = view.component(first) else {
        return false;
    };
    let mut current = first;
    let mut prev = component.ends[0];

    for _ in 0..view.active_count() {
        let Some(component) = view.component(current) else {
            return false;
        };
        labels[current.0].branch = BranchLabel::Live(BranchId(0));
        let next = component.other_end(prev);
        if view.degree(next) < 2 {
            return false;
        }
        labels[current.0].direction = Some(next);
        match view.next_component(next, current) {
            Some(c) => current = c,
            None => return false,
        }
        prev = next;
    }
    true
}

/// Walk a branch from a junction through pass-through terminals.
///
/// Returns true if the branch ends at another junction, false if it was a
/// dead end.
fn walk_branch(
    view: &View<'_>,
    node: TerminalId,
    start: ComponentId,
    branch: BranchId,
    labels: &mut [ComponentLabel],
) -> bool {
    let mut members = Vec::new();
    let mut at = node;
    let mut current = start;

    loop {
        let Some(component) = view.component(current) else {
            return false;
        };
        members.push(current);
        labels[current.0].branch = BranchLabel::Live(branch);

        let next = component.other_end(at);
        if view.degree(next) < 2 {
            for id in members {
                labels[id.0] = ComponentLabel {
                    branch: BranchLabel::DeadEnd,
                    direction: None,
                };
            }
            return false;
        }
        labels[current.0].direction = Some(next);
        if view.is_junction(next) {
            return true;
        }

        at = next;
        match view.next_component(at, current) {
            Some(c) => current = c,
            None => return false,
        }
    }
}

/// Enumerate independent loops of a pruned view.
///
/// Each round walks from the first remaining component, always leaving a
/// terminal by a component other than the one it arrived on, until a
/// terminal repeats. Any leading tail before the repeated terminal is
/// trimmed. The loop's first component is then removed, along with the dead
/// ends that removal creates, so the next round finds a different loop.
fn find_loops(mut scratch: View<'_>) -> Vec<Vec<ComponentId>> {
    let mut loops = Vec::new();

    while let Some(start) = scratch.first_active() {
        let Some(component) = scratch.component(start) else {
            break;
        };
        let mut terminals = vec![component.ends[0]];
        let mut members = Vec::new();
        let mut current = start;
        let mut prev = component.ends[0];

        loop {
            let Some(component) = scratch.component(current) else {
                break;
            };
            members.push(current);
            let next = component.other_end(prev);
            let closed = terminals.contains(&next);
            terminals.push(next);
            if closed {
                break;
            }
            match scratch.next_component(next, current) {
                Some(c) => current = c,
                None => break,
            }
            prev = next;
        }

        let Some(&last) = terminals.last() else {
            break;
        };
        let tail = terminals.iter().position(|t| *t == last).unwrap_or(0);
        if tail == terminals.len() - 1 {
            // The walk ran into a terminal it could not leave; nothing closed.
            tracing::warn!("loop walk from {} did not close", start);
            break;
        }
        let cycle: Vec<ComponentId> = members.split_off(tail);

        scratch.remove(cycle[0]);
        scratch.strip_danglers();
        loops.push(cycle);
    }

    loops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(row: usize, col: usize) -> TerminalId {
        TerminalId::new(row, col)
    }

    /// Battery (0,0)-(1,0) with a resistor on the right edge of a 2x2 square.
    fn series_loop() -> Circuit {
        let mut c = Circuit::new(2, 3).unwrap();
        c.add_battery(t(0, 0), t(1, 0), 6.0).unwrap();
        c.add_wire(t(0, 0), t(0, 1)).unwrap();
        c.add_resistor(t(0, 1), t(1, 1), 3.0).unwrap();
        c.add_wire(t(1, 1), t(1, 0)).unwrap();
        c
    }

    #[test]
    fn test_single_loop_is_one_branch() {
        let circuit = series_loop();
        let topo = Topology::discover(&circuit);

        assert!(topo.nodes.is_empty());
        assert_eq!(topo.num_branches, 1);
        assert_eq!(topo.loops.len(), 1);
        assert_eq!(topo.loops[0].len(), 4);
        for id in circuit.component_ids() {
            let label = topo.label(id);
            assert_eq!(label.branch, BranchLabel::Live(BranchId(0)));
            assert!(label.direction.is_some());
        }
    }

    #[test]
    fn test_directions_follow_the_walk() {
        let circuit = series_loop();
        let topo = Topology::discover(&circuit);
        let battery = circuit.component_between(t(0, 0), t(1, 0)).unwrap();
        let resistor = circuit.component_between(t(0, 1), t(1, 1)).unwrap();

        // The walk starts at the battery's first end and goes round once.
        assert_eq!(topo.label(battery).direction, Some(t(1, 0)));
        assert_eq!(topo.label(resistor).direction, Some(t(0, 1)));
    }

    #[test]
    fn test_open_chain_is_incomplete() {
        let mut circuit = Circuit::new(1, 3).unwrap();
        circuit.add_resistor(t(0, 0), t(0, 1), 1.0).unwrap();
        circuit.add_wire(t(0, 1), t(0, 2)).unwrap();
        let topo = Topology::discover(&circuit);

        assert!(!topo.is_complete());
        assert!(topo.loops.is_empty());
    }

    #[test]
    fn test_empty_circuit_is_incomplete() {
        let circuit = Circuit::new(2, 2).unwrap();
        assert!(!Topology::discover(&circuit).is_complete());
    }

    #[test]
    fn test_stub_is_pruned() {
        let mut circuit = series_loop();
        let stub = circuit.add_resistor(t(0, 1), t(0, 2), 7.0).unwrap();
        let topo = Topology::discover(&circuit);

        assert_eq!(topo.dead_ends, vec![stub]);
        assert_eq!(topo.label(stub).branch, BranchLabel::DeadEnd);
        assert!(!topo.in_core(stub));
        // With the stub gone the junction disappears too.
        assert!(topo.nodes.is_empty());
        assert_eq!(topo.num_branches, 1);
        assert_eq!(topo.loops.len(), 1);
    }

    #[test]
    fn test_parallel_branches() {
        // 10V battery, 1 ohm feed, 5 ohm and 2 ohm in parallel.
        let mut circuit = Circuit::new(2, 3).unwrap();
        circuit.add_battery(t(0, 0), t(1, 0), 10.0).unwrap();
        circuit.add_resistor(t(0, 0), t(0, 1), 1.0).unwrap();
        circuit.add_wire(t(0, 1), t(0, 2)).unwrap();
        circuit.add_resistor(t(0, 1), t(1, 1), 5.0).unwrap();
        circuit.add_resistor(t(0, 2), t(1, 2), 2.0).unwrap();
        circuit.add_wire(t(1, 2), t(1, 1)).unwrap();
        circuit.add_wire(t(1, 1), t(1, 0)).unwrap();

        let topo = Topology::discover(&circuit);
        assert_eq!(topo.nodes, vec![t(0, 1), t(1, 1)]);
        assert_eq!(topo.num_branches, 3);
        assert_eq!(topo.loops.len(), 2);
        // Square system: (nodes - 1) + loops == branches
        assert_eq!(topo.nodes.len() - 1 + topo.loops.len(), topo.num_branches);

        let feed = circuit.component_between(t(0, 0), t(0, 1)).unwrap();
        let battery = circuit.component_between(t(0, 0), t(1, 0)).unwrap();
        assert_eq!(topo.label(feed).branch, topo.label(battery).branch);
    }

    #[test]
    fn test_tail_before_cycle_is_trimmed() {
        // Two loops joined by a bridge wire, with the bridge added first so
        // the first loop walk starts off the cycle.
        let mut circuit = Circuit::new(2, 4).unwrap();
        let bridge = circuit.add_wire(t(0, 1), t(0, 2)).unwrap();
        circuit.add_battery(t(0, 0), t(1, 0), 6.0).unwrap();
        circuit.add_wire(t(0, 0), t(0, 1)).unwrap();
        circuit.add_resistor(t(0, 1), t(1, 1), 3.0).unwrap();
        circuit.add_wire(t(1, 1), t(1, 0)).unwrap();
        circuit.add_resistor(t(0, 2), t(0, 3), 2.0).unwrap();
        circuit.add_resistor(t(0, 3), t(1, 3), 2.0).unwrap();
        circuit.add_resistor(t(1, 3), t(1, 2), 2.0).unwrap();
        circuit.add_wire(t(1, 2), t(0, 2)).unwrap();

        let topo = Topology::discover(&circuit);
        assert_eq!(topo.num_branches, 3);
        assert_eq!(topo.loops.len(), 2);
        for lp in &topo.loops {
            assert!(!lp.contains(&bridge));
            let first = circuit.component(lp[0]).unwrap();
            let last = circuit.component(*lp.last().unwrap()).unwrap();
            assert!(first.ends.iter().any(|e| last.touches(*e)));
        }
    }

    #[test]
    fn test_view_degrees_follow_removals() {
        let mut circuit = series_loop();
        let stub = circuit.add_resistor(t(0, 1), t(0, 2), 7.0).unwrap();
        let mut view = View::new(&circuit, |_| true);
        assert!(view.is_junction(t(0, 1)));
        assert_eq!(view.active_count(), 5);

        assert_eq!(view.remove_dangler(), Some(stub));
        assert_eq!(view.remove_dangler(), None);
        view.remove(stub);
        assert_eq!(view.active_count(), 4);
        for terminal in circuit.terminals() {
            assert_eq!(view.degree(terminal.id), view.incident(terminal.id).count());
        }
        assert!(!view.is_junction(t(0, 1)));
        assert_eq!(view.degree(t(0, 2)), 0);
    }

    #[test]
    fn test_filtered_view_ignores_excluded_components() {
        let circuit = series_loop();
        let topo = Topology::discover_filtered(&circuit, |c| !c.is_resistor());
        assert!(!topo.is_complete());
    }
}
