//! Index-based search tree.
//!
//! Nodes live in one `Vec` and refer to each other by index, so a finished
//! search is dropped in one go. Rewards are always stored from the searching
//! seat's point of view.

use rand::Rng;

use super::sim::SimAction;

pub type NodeId = usize;

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    /// Action that led here; `None` at the root.
    pub action: Option<SimAction>,
    pub children: Vec<NodeId>,
    pub untried: Vec<SimAction>,
    pub visits: u32,
    pub wins: f64,
    /// Whether the searching seat chooses among this node's children.
    pub root_acts: bool,
}

impl Node {
    fn new(
        parent: Option<NodeId>,
        action: Option<SimAction>,
        untried: Vec<SimAction>,
        root_acts: bool,
    ) -> Self {
        Self {
            parent,
            action,
            children: Vec::new(),
            untried,
            visits: 0,
            wins: 0.0,
            root_acts,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / self.visits as f64
        }
    }
}

/// Aggregated root-child statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildStats {
    pub action: SimAction,
    pub visits: u32,
    pub wins: f64,
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new(root_actions: Vec<SimAction>) -> Self {
        Self {
            nodes: vec![Node::new(None, None, root_actions, true)],
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_untried(&self, id: NodeId) -> bool {
        !self.nodes[id].untried.is_empty()
    }

    /// Take one untried action at random.
    pub fn take_untried<R: Rng + ?Sized>(&mut self, id: NodeId, rng: &mut R) -> Option<SimAction> {
        let untried = &mut self.nodes[id].untried;
        if untried.is_empty() {
            return None;
        }
        let i = rng.random_range(0..untried.len());
        Some(untried.swap_remove(i))
    }

    pub fn expand(
        &mut self,
        parent: NodeId,
        action: SimAction,
        untried: Vec<SimAction>,
        root_acts: bool,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes
            .push(Node::new(Some(parent), Some(action), untried, root_acts));
        self.nodes[parent].children.push(id);
        id
    }

    /// UCT child of `id`. The win-rate is flipped on opponent nodes.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let parent = &self.nodes[id];
        let ln_parent = (parent.visits.max(1) as f64).ln();
        parent
            .children
            .iter()
            .copied()
            .map(|c| {
                let child = &self.nodes[c];
                let score = if child.visits == 0 {
                    f64::INFINITY
                } else {
                    let rate = child.win_rate();
                    let exploit = if parent.root_acts { rate } else { 1.0 - rate };
                    exploit + exploration * (ln_parent / child.visits as f64).sqrt()
                };
                (c, score)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }

    pub fn backpropagate(&mut self, leaf: NodeId, reward: f64) {
        let mut cursor = Some(leaf);
        while let Some(id) = cursor {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.wins += reward;
            cursor = node.parent;
        }
    }

    pub fn root_stats(&self) -> Vec<ChildStats> {
        self.nodes[ROOT]
            .children
            .iter()
            .filter_map(|&c| {
                let n = &self.nodes[c];
                Some(ChildStats {
                    action: n.action?,
                    visits: n.visits,
                    wins: n.wins,
                })
            })
            .collect()
    }
}

/// Most-visited action; ties go to the better win-rate.
pub fn most_visited(stats: &[ChildStats]) -> Option<ChildStats> {
    stats.iter().copied().filter(|s| s.visits > 0).max_by(|a, b| {
        a.visits.cmp(&b.visits).then_with(|| {
            let ra = a.wins / a.visits as f64;
            let rb = b.wins / b.visits as f64;
            ra.total_cmp(&rb)
        })
    })
}
