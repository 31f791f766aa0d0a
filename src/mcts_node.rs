use crate::board::ActionId;

/// Statistics stored in a single node of the search tree.
///
/// A node stands for the position reached by playing `action` from its
/// parent. `q_value` is expressed from the perspective of the player to move
/// at the parent, i.e. it is the value of choosing `action` there.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsNode {
    /// The action that led to this node from its parent. `None` for a fresh root.
    pub action: Option<ActionId>,
    /// The number of backups that passed through this node.
    pub visits: u32,
    /// Running mean of the values backed up through this node.
    pub q_value: f64,
    /// Prior probability supplied by the evaluator when the parent was expanded.
    pub prior: f64,
}

impl Default for MctsNode {
    fn default() -> Self {
        MctsNode::root()
    }
}

impl MctsNode {
    /// Creates the statistics of a fresh root: no visits and a prior of 1.
    pub fn root() -> Self {
        MctsNode {
            action: None,
            visits: 0,
            q_value: 0.0,
            prior: 1.0,
        }
    }

    /// Creates an unvisited child reached by `action`.
    pub fn new(action: ActionId, prior: f64) -> Self {
        MctsNode {
            action: Some(action),
            visits: 0,
            q_value: 0.0,
            prior,
        }
    }

    /// Records one backup of `leaf_value`, already signed for this node.
    pub fn update(&mut self, leaf_value: f64) {
        self.visits += 1;
        self.q_value += (leaf_value - self.q_value) / f64::from(self.visits);
    }

    /// The exploration bonus `c * P * sqrt(N_parent) / (1 + N)`.
    pub fn exploration_bonus(&self, parent_visits: u32, exploration_constant: f64) -> f64 {
        exploration_constant * self.prior * f64::from(parent_visits).sqrt()
            / (1.0 + f64::from(self.visits))
    }

    /// The PUCT score `Q + U` used to pick a child during selection.
    pub fn puct_score(&self, parent_visits: u32, exploration_constant: f64) -> f64 {
        self.q_value + self.exploration_bonus(parent_visits, exploration_constant)
    }
}

#[cfg(test)]
mod tests {
    use super::MctsNode;

    #[test]
    fn update_keeps_running_mean() {
        let mut node = MctsNode::new(3, 0.5);

        node.update(1.0);
        node.update(-1.0);
        node.update(1.0);

        assert_eq!(node.visits, 3);
        assert!((node.q_value - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(node.prior, 0.5);
    }

    #[test]
    fn puct_score_matches_formula() {
        let node = MctsNode {
            action: Some(0),
            visits: 10,
            q_value: 0.5,
            prior: 0.3,
        };

        let expected = 0.5 + 5.0 * 0.3 * 11f64.sqrt() / 11.0;

        assert!((node.puct_score(11, 5.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn fresh_root_has_unit_prior() {
        let root = MctsNode::default();
        assert_eq!(root.action, None);
        assert_eq!(root.visits, 0);
        assert_eq!(root.prior, 1.0);
    }
}
