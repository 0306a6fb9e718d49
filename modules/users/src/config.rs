use serde::{Deserialize, Serialize};

/// Configuration for the users module (`modules.users`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersConfig {
    #[serde(default = "default_page")]
    pub default_page: u64,
    #[serde(default = "default_per_page")]
    pub default_per_page: u64,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            default_page: default_page(),
            default_per_page: default_per_page(),
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    10
}
