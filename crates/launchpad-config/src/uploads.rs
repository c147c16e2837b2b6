use serde::Deserialize;

/// Limits applied to multipart uploads
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadsConfig {
    /// Largest accepted single file, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Most files accepted in one request
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
        }
    }
}

const fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

const fn default_max_files() -> usize {
    5
}
