//! Explicit game graph with bottom-up outcome propagation.
//!
//! The graph is materialized breadth-first from a root position. Nodes are
//! identified by table key, so transpositions (and, with symmetric keys,
//! symmetric positions) share one node. Moves only ever add marks, so the
//! graph is acyclic and every path ends in a terminal leaf.
//!
//! Propagation starts from the leaves. Each node counts its children still
//! unlabeled; it is labeled once that count reaches zero, or earlier as soon
//! as some child turns out to be a win for its mover.

use std::collections::{HashMap, VecDeque};

use mnk_core::{Board, CanonicalKey, KeyMode, Outcome};
use serde::Serialize;
use tracing::{debug, info};

use crate::budget::Budget;
use crate::error::SolveError;

/// Index of a node in the graph arena.
pub type NodeId = usize;

/// One position of the game graph.
#[derive(Debug, Clone)]
pub struct Node {
    key: CanonicalKey,
    /// First position reached with this key
    board: Board,
    children: Vec<NodeId>,
    parents: Vec<NodeId>,
    outcome: Option<Outcome>,
    /// Children not yet labeled
    pending: usize,
    /// Some labeled child is a draw
    saw_draw: bool,
}

impl Node {
    fn new(key: CanonicalKey, board: Board) -> Node {
        Node {
            key,
            board,
            children: Vec::new(),
            parents: Vec::new(),
            outcome: None,
            pending: 0,
            saw_draw: false,
        }
    }

    pub fn key(&self) -> &CanonicalKey {
        &self.key
    }

    /// Representative position for this key.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Perfect-play outcome, once labeled.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// True for finished games.
    pub fn is_terminal(&self) -> bool {
        self.board.is_over()
    }
}

/// Size of a built graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub states: usize,
    pub leaves: usize,
    pub edges: usize,
}

/// The reachable state graph from a root position.
pub struct GameGraph {
    key_mode: KeyMode,
    nodes: Vec<Node>,
    index: HashMap<CanonicalKey, NodeId>,
    leaves: Vec<NodeId>,
    edges: usize,
}

impl GameGraph {
    /// Root node id.
    pub const ROOT: NodeId = 0;

    /// Materialize every position reachable from `root`, breadth first.
    pub fn build(
        root: &Board,
        key_mode: KeyMode,
        budget: &Budget,
    ) -> Result<GameGraph, SolveError> {
        let mut clock = budget.start();
        let root_key = root.key(key_mode);

        let mut graph = GameGraph {
            key_mode,
            nodes: vec![Node::new(root_key.clone(), root.clone())],
            index: HashMap::from([(root_key, Self::ROOT)]),
            leaves: Vec::new(),
            edges: 0,
        };

        let mut queue: VecDeque<NodeId> = VecDeque::from([Self::ROOT]);
        while let Some(id) = queue.pop_front() {
            clock.check(graph.nodes.len())?;

            // Finished games are leaves: never expanded.
            if let Some(outcome) = graph.nodes[id].board.winner() {
                graph.nodes[id].outcome = Some(outcome);
                graph.leaves.push(id);
                continue;
            }

            let children: Vec<Board> =
                graph.nodes[id].board.successors().map(|(_, child)| child).collect();
            for child in children {
                let key = child.key(key_mode);
                let child_id = match graph.index.get(&key) {
                    Some(&existing) => existing,
                    None => {
                        let new_id = graph.nodes.len();
                        graph.index.insert(key.clone(), new_id);
                        graph.nodes.push(Node::new(key, child));
                        queue.push_back(new_id);
                        new_id
                    }
                };

                // Symmetric moves lead to the same child; keep one edge.
                if !graph.nodes[id].children.contains(&child_id) {
                    graph.nodes[id].children.push(child_id);
                    graph.nodes[child_id].parents.push(id);
                    graph.edges += 1;
                }
            }
            graph.nodes[id].pending = graph.nodes[id].children.len();
        }

        info!(
            states = graph.nodes.len(),
            leaves = graph.leaves.len(),
            edges = graph.edges,
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "built game graph"
        );
        Ok(graph)
    }

    /// Label every node from the leaves upward. Returns the root outcome.
    pub fn propagate(&mut self) -> Result<Outcome, SolveError> {
        let mut queue: VecDeque<NodeId> = self.leaves.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            let Some(outcome) = self.nodes[id].outcome else {
                continue;
            };

            for i in 0..self.nodes[id].parents.len() {
                let parent_id = self.nodes[id].parents[i];
                let parent = &mut self.nodes[parent_id];
                if parent.outcome.is_some() {
                    // Already decided by an earlier winning child.
                    continue;
                }

                parent.pending -= 1;
                let mover = parent.board.to_move();
                match outcome {
                    Outcome::Win(player) if player == mover => {
                        parent.outcome = Some(outcome);
                    }
                    Outcome::Draw => parent.saw_draw = true,
                    Outcome::Win(_) => {}
                }

                if parent.outcome.is_none() && parent.pending == 0 {
                    parent.outcome = Some(if parent.saw_draw {
                        Outcome::Draw
                    } else {
                        Outcome::Win(mover.opponent())
                    });
                }

                if parent.outcome.is_some() {
                    queue.push_back(parent_id);
                }
            }
        }

        let unlabeled = self.nodes.iter().filter(|n| n.outcome.is_none()).count();
        if unlabeled > 0 {
            return Err(SolveError::Incomplete { unlabeled });
        }
        debug!(states = self.nodes.len(), "propagation complete");

        self.nodes[Self::ROOT].outcome.ok_or(SolveError::Incomplete { unlabeled: 1 })
    }

    pub fn key_mode(&self) -> KeyMode {
        self.key_mode
    }

    /// Number of distinct states.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            states: self.len(),
            leaves: self.leaf_count(),
            edges: self.edge_count(),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Node> + '_ {
        self.leaves.iter().map(|&id| &self.nodes[id])
    }

    /// Outcome of the state with this key, once labeled.
    pub fn outcome(&self, key: &CanonicalKey) -> Option<Outcome> {
        self.index.get(key).and_then(|&id| self.nodes[id].outcome)
    }

    /// Outcome of the root, once labeled.
    pub fn root_outcome(&self) -> Option<Outcome> {
        self.nodes[Self::ROOT].outcome
    }
}

/// Build the graph from `board` and propagate outcomes to it.
pub fn solve_graph(
    board: &Board,
    key_mode: KeyMode,
    budget: &Budget,
) -> Result<Outcome, SolveError> {
    let mut graph = GameGraph::build(board, key_mode, budget)?;
    graph.propagate()
}
