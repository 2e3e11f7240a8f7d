//! `SuccessionGraph`: a directed multigraph of state equivalence classes
//! as it is built.
//!
//! Node identifiers are per-graph monotonic indices rather than a
//! process-wide counter: a single graph is only ever mutated by one
//! `Enumerator` at a time, so there is no concurrent-allocation hazard to
//! guard against here.

use crate::error::{CoreResult, StateError};
use crate::featurizable::Feature;
use crate::state::State;
use crate::succession::Succession;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
pub struct SuccessionGraph {
    states: Vec<State>,
    state_to_node: HashMap<State, NodeId>,
    root: Option<NodeId>,
    edges: HashMap<(NodeId, NodeId), Vec<Succession>>,
    successors_index: HashMap<NodeId, Vec<NodeId>>,
    predecessors_index: HashMap<NodeId, Vec<NodeId>>,
}

impl SuccessionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.states.len()).map(NodeId)
    }

    pub fn state(&self, node: NodeId) -> &State {
        &self.states[node.0]
    }

    pub fn node(&self, state: &State) -> Option<NodeId> {
        self.state_to_node.get(state).copied()
    }

    /// Attaches `value` to the state already stored at `node`, without
    /// touching the bijection's lookup key (so the node remains reachable
    /// by its pre-marker state, e.g. to mark it `LocalStop` after it has
    /// already been bound).
    pub fn mark_feature<T: Feature + 'static>(&mut self, node: NodeId, value: T) {
        self.states[node.0].features_mut().set(value);
    }

    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        self.successors_index
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn predecessors(&self, node: NodeId) -> &[NodeId] {
        self.predecessors_index
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn outgoing_successions(&self, node: NodeId) -> Vec<&Succession> {
        self.successors_index
            .get(&node)
            .into_iter()
            .flatten()
            .flat_map(move |&child| self.edges.get(&(node, child)).into_iter().flatten())
            .collect()
    }

    pub fn incoming_successions(&self, node: NodeId) -> Vec<&Succession> {
        self.predecessors_index
            .get(&node)
            .into_iter()
            .flatten()
            .flat_map(move |&parent| self.edges.get(&(parent, node)).into_iter().flatten())
            .collect()
    }

    pub fn successions(&self) -> impl Iterator<Item = &Succession> {
        self.edges.values().flatten()
    }

    /// Inserts `succession`'s child into the graph (binding a new node if
    /// its state has never been seen), recording the succession on the
    /// parent -> child edge. Returns whether the child is a *new* node
    /// Returns whether the child node had never been seen before.
    pub fn add(&mut self, succession: Succession) -> CoreResult<bool> {
        match &succession.parent {
            None => {
                if self.root.is_some() {
                    return Err(StateError::RootAlreadySet.into());
                }
                let node = self.bind_node(succession.child.clone());
                self.root = Some(node);
                Ok(true)
            }
            Some(parent_state) => {
                let parent_node = self
                    .state_to_node
                    .get(parent_state)
                    .copied()
                    .ok_or(StateError::DanglingParent)?;
                let is_new = !self.state_to_node.contains_key(&succession.child);
                let child_node = self.bind_node(succession.child.clone());
                self.link(parent_node, child_node);
                self.edges
                    .entry((parent_node, child_node))
                    .or_default()
                    .push(succession);
                Ok(is_new)
            }
        }
    }

    fn bind_node(&mut self, state: State) -> NodeId {
        if let Some(&id) = self.state_to_node.get(&state) {
            return id;
        }
        let id = NodeId(self.states.len());
        self.states.push(state.clone());
        self.state_to_node.insert(state, id);
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        let succ_list = self.successors_index.entry(parent).or_default();
        if !succ_list.contains(&child) {
            succ_list.push(child);
        }
        let pred_list = self.predecessors_index.entry(child).or_default();
        if !pred_list.contains(&parent) {
            pred_list.push(parent);
        }
    }

    /// Applies `f` to every state reachable from the root, producing a new
    /// graph containing exactly those (transformed) nodes, with confluences
    /// computed on the transformed states.
    pub fn modify_states<F>(&self, mut f: F) -> CoreResult<SuccessionGraph>
    where
        F: FnMut(&State) -> State,
    {
        let mut out = SuccessionGraph::new();
        let Some(root) = self.root else {
            return Ok(out);
        };
        out.add(Succession::root(f(self.state(root))))?;

        let mut visited: HashSet<NodeId> = HashSet::new();
        visited.insert(root);
        let mut queue = VecDeque::new();
        queue.push_back(root);

        while let Some(parent) = queue.pop_front() {
            let parent_new_state = f(self.state(parent));
            for &child in self.successors(parent) {
                let first_visit = visited.insert(child);
                for succ in self.edges.get(&(parent, child)).into_iter().flatten() {
                    let child_new_state = f(&succ.child);
                    let new_succ = Succession::step(
                        parent_new_state.clone(),
                        succ.event.clone().unwrap_or_default(),
                        child_new_state,
                    );
                    out.add(new_succ)?;
                }
                if first_visit {
                    queue.push_back(child);
                }
            }
        }
        Ok(out)
    }
}
