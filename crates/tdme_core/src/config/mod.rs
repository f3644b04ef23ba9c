//! Configuration system
//!
//! Every value is constructor-time: partitions and path finders copy their
//! configuration when built and never observe later edits.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Format follows the extension
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Which broad phase a world uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartitionKind {
    /// Hierarchical oct-tree
    #[default]
    OctTree,
    /// Linear scan
    None,
}

/// Spatial partition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Partition implementation
    pub kind: PartitionKind,
    /// Edge length of leaf cells
    pub cell_size: f32,
    /// Subdivision levels above the leaves
    pub max_depth: u32,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            kind: PartitionKind::OctTree,
            cell_size: 16.0,
            max_depth: 2,
        }
    }
}

impl Config for PartitionConfig {}

/// Path finding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathFindingConfig {
    /// Search step budget; running out reports "no path"
    pub steps_max: usize,
    /// Lattice spacing between neighbor samples
    pub step_size: f32,
    /// Distance at which a sample counts as the goal
    pub step_size_last: f32,
    /// Highest ledge an actor climbs in one step
    pub actor_step_up_max: f32,
    /// Deepest drop an actor walks down in one step
    pub actor_step_down_max: f32,
    /// Grid used to merge nearby samples into one node
    pub node_quantization: f32,
}

impl Default for PathFindingConfig {
    fn default() -> Self {
        Self {
            steps_max: 1000,
            step_size: 0.5,
            step_size_last: 0.75,
            actor_step_up_max: 0.5,
            actor_step_down_max: 1.0,
            node_quantization: 0.1,
        }
    }
}

impl Config for PathFindingConfig {}

/// Settings for a whole world and its path finder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Broad phase
    pub partition: PartitionConfig,
    /// Path finding
    pub path_finding: PathFindingConfig,
}

impl Config for WorldConfig {}
