//! Configuration types for AI players

use std::fmt;
use std::str::FromStr;

use wargrid_core::search::{SearchConfig, SearchMode, DEFAULT_NODE_BUDGET, DEFAULT_START_DEPTH};
use wargrid_core::{Error, Heuristics};

/// Player type for games
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerType {
    /// Budgeted alpha-beta search
    Minimax,
    /// Uniformly random legal move
    Random,
    /// First move the generator yields
    FirstValid,
    /// Moves typed at a [`HumanConsole`](crate::HumanConsole)
    Human,
}

impl Default for PlayerType {
    fn default() -> Self {
        PlayerType::Minimax
    }
}

impl fmt::Display for PlayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerType::Minimax => write!(f, "minimax"),
            PlayerType::Random => write!(f, "random"),
            PlayerType::FirstValid => write!(f, "first-valid"),
            PlayerType::Human => write!(f, "human"),
        }
    }
}

impl FromStr for PlayerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimax" | "alphabeta" | "alpha-beta" | "ai" => Ok(PlayerType::Minimax),
            "random" => Ok(PlayerType::Random),
            "first" | "first-valid" | "firstvalid" => Ok(PlayerType::FirstValid),
            "human" | "user" => Ok(PlayerType::Human),
            other => Err(Error::InvalidConfiguration {
                message: format!("unknown player type '{}' (minimax, random, first-valid, human)", other),
            }),
        }
    }
}

/// AI configuration for one side
#[derive(Clone, Debug)]
pub struct AiConfig {
    pub player_type: PlayerType,
    /// Nodes per decision (minimax only)
    pub node_budget: u64,
    /// Deepest iteration (minimax only)
    pub max_depth_cap: Option<u32>,
    /// First iteration depth (minimax only)
    pub start_depth: u32,
    /// Heuristics for evaluation
    pub heuristics: Heuristics,
    /// Random seed for reproducibility (None = 42)
    pub seed: Option<u64>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            player_type: PlayerType::Minimax,
            node_budget: DEFAULT_NODE_BUDGET,
            max_depth_cap: None,
            start_depth: DEFAULT_START_DEPTH,
            heuristics: Heuristics::default(),
            seed: None,
        }
    }
}

impl AiConfig {
    /// Search player with the given node budget
    pub fn minimax(node_budget: u64) -> Self {
        Self {
            player_type: PlayerType::Minimax,
            node_budget,
            ..Default::default()
        }
    }

    pub fn random() -> Self {
        Self {
            player_type: PlayerType::Random,
            ..Default::default()
        }
    }

    pub fn first_valid() -> Self {
        Self {
            player_type: PlayerType::FirstValid,
            ..Default::default()
        }
    }

    pub fn human() -> Self {
        Self {
            player_type: PlayerType::Human,
            ..Default::default()
        }
    }

    /// Config of the given type with defaults for everything else
    pub fn of_type(player_type: PlayerType) -> Self {
        Self {
            player_type,
            ..Default::default()
        }
    }

    /// Set custom heuristics
    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_budget(mut self, node_budget: u64) -> Self {
        self.node_budget = node_budget;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth_cap = Some(max_depth);
        self
    }

    /// Policy search settings for one game
    pub fn search_config(&self, seed: u64) -> SearchConfig {
        SearchConfig {
            mode: SearchMode::Policy,
            node_budget: self.node_budget,
            max_depth_cap: self.max_depth_cap,
            start_depth: self.start_depth,
            seed,
        }
    }

    /// Short description for logs and reports
    pub fn label(&self) -> String {
        match self.player_type {
            PlayerType::Minimax => format!("minimax({})", self.node_budget),
            other => other.to_string(),
        }
    }
}
