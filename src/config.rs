//! Search and agent configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mcts::SearchError;

/// Configuration for the search and the agent wrapping it.
///
/// Every field has a default, so a partial document deserializes into a
/// complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Exploration constant `c` of the PUCT rule. Larger values lean on the
    /// priors, smaller values on the backed-up Q-values.
    pub c_puct: f64,

    /// Number of playouts per decision.
    pub n_playout: u32,

    /// Temperature applied to visit counts when turning them into move
    /// probabilities. Near zero this is argmax; 1.0 is proportional to visits.
    ///
    /// The search takes the temperature per call, so this is the value a
    /// caller hands to `Game::start_self_play`, `Game::start_play` or
    /// `Agent::decide`.
    pub temperature: f64,

    /// Whether agents built from this config run in self-play mode: noisy
    /// sampling and subtree reuse instead of a fresh tree per move.
    pub self_play: bool,

    /// Dirichlet concentration used for self-play exploration noise.
    pub dirichlet_alpha: f64,

    /// Share of the sampling distribution taken by the noise.
    pub noise_weight: f64,

    /// When set, playouts run until this many milliseconds have passed
    /// instead of a fixed count.
    pub time_budget_ms: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            c_puct: 5.0,
            n_playout: 300,
            temperature: 1e-3,
            self_play: false,
            dirichlet_alpha: 0.3,
            noise_weight: 0.25,
            time_budget_ms: None,
        }
    }
}

impl MctsConfig {
    /// Config for generating training games: visit-proportional sampling
    /// with exploration noise.
    pub fn for_self_play() -> Self {
        Self {
            temperature: 1.0,
            self_play: true,
            ..Self::default()
        }
    }

    /// Config for playing to win: near-greedy move choice.
    pub fn for_evaluation() -> Self {
        Self::default()
    }

    /// Builder pattern: set number of playouts.
    pub fn with_playouts(mut self, n: u32) -> Self {
        self.n_playout = n;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_c_puct(mut self, c: f64) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set temperature.
    pub fn with_temperature(mut self, t: f64) -> Self {
        self.temperature = t;
        self
    }

    /// Builder pattern: set the Dirichlet concentration.
    pub fn with_dirichlet_alpha(mut self, alpha: f64) -> Self {
        self.dirichlet_alpha = alpha;
        self
    }

    /// Builder pattern: set a time budget per decision.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = Some(budget.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    /// The time budget as a `Duration`.
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.c_puct.is_finite() && self.c_puct > 0.0) {
            return Err(SearchError::InvalidParameter(format!(
                "c_puct must be positive, got {}",
                self.c_puct
            )));
        }
        if self.n_playout == 0 && self.time_budget_ms.is_none() {
            return Err(SearchError::InvalidParameter(
                "n_playout must be at least 1".to_string(),
            ));
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(SearchError::InvalidParameter(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        if !(self.dirichlet_alpha.is_finite() && self.dirichlet_alpha > 0.0) {
            return Err(SearchError::InvalidParameter(format!(
                "dirichlet_alpha must be positive, got {}",
                self.dirichlet_alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.noise_weight) {
            return Err(SearchError::InvalidParameter(format!(
                "noise_weight must be within [0, 1], got {}",
                self.noise_weight
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.n_playout, 300);
        assert!((config.c_puct - 5.0).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::for_self_play()
            .with_playouts(100)
            .with_c_puct(1.5)
            .with_time_budget(Duration::from_millis(250));

        assert_eq!(config.n_playout, 100);
        assert!((config.temperature - 1.0).abs() < 1e-12);
        assert!(config.self_play);
        assert_eq!(config.time_budget(), Some(Duration::from_millis(250)));
        assert!(!MctsConfig::for_evaluation().self_play);
    }

    #[test]
    fn test_partial_json_is_completed_with_defaults() {
        let config: MctsConfig =
            serde_json::from_str(r#"{ "n_playout": 50, "temperature": 1.0 }"#).unwrap();

        assert_eq!(config.n_playout, 50);
        assert!((config.temperature - 1.0).abs() < 1e-12);
        assert!((config.dirichlet_alpha - 0.3).abs() < 1e-12);
        assert!(!config.self_play);
        assert_eq!(config.time_budget_ms, None);

        let config: MctsConfig = serde_json::from_str(r#"{ "self_play": true }"#).unwrap();
        assert!(config.self_play);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(MctsConfig::default().with_c_puct(0.0).validate().is_err());
        assert!(MctsConfig::default().with_playouts(0).validate().is_err());
        assert!(MctsConfig::default().with_temperature(-1.0).validate().is_err());
        assert!(MctsConfig::default().with_dirichlet_alpha(0.0).validate().is_err());
        let config = MctsConfig {
            noise_weight: 1.5,
            ..MctsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SearchError::InvalidParameter(_))
        ));
    }
}
