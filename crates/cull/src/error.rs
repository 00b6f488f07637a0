/// Errors from configuring or constructing the occlusion engine.
///
/// Per-tick culling never fails; degenerate geometry resolves to "visible".
#[derive(Debug, thiserror::Error)]
pub enum CullError {
    #[error("invalid config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
