// crates/core/src/config/mod.rs
pub mod params;
pub mod track;

pub use params::{RunnerParams, INDEX_KEY, SOURCE_FILE_KEY};
pub use track::{ClusterConfig, Operation, TrackConfig};

/// Convert YAML to JSON - utility for CLI validation
pub fn yaml_to_json(yaml_str: &str) -> anyhow::Result<String> {
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml_str)
        .map_err(|e| anyhow::anyhow!("Failed to parse YAML: {}", e))?;
    serde_json::to_string_pretty(&yaml_value)
        .map_err(|e| anyhow::anyhow!("Failed to convert to JSON: {}", e))
}
