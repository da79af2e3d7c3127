//! Process-level configuration from environment variables.
//!
//! Gameplay tuning lives in the balance config; this covers only how the
//! host process runs.

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of concurrent game rooms
    pub max_rooms: usize,
    /// Path to a balance config JSON file; defaults apply when unset
    pub balance_path: Option<String>,
    /// Fixed match seed; a random seed is drawn when unset
    pub seed: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_rooms: 100,
            balance_path: None,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(max_rooms) = std::env::var("MAX_ROOMS") {
            if let Ok(parsed) = max_rooms.parse::<usize>() {
                if parsed > 0 && parsed <= 10_000 {
                    config.max_rooms = parsed;
                } else {
                    tracing::warn!("MAX_ROOMS must be 1-10000, using default");
                }
            } else {
                tracing::warn!("Invalid MAX_ROOMS '{}', using default", max_rooms);
            }
        }

        if let Ok(path) = std::env::var("BALANCE_CONFIG_PATH") {
            config.balance_path = Some(path);
        }

        if let Ok(seed) = std::env::var("MATCH_SEED") {
            if let Ok(parsed) = seed.parse::<u32>() {
                config.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid MATCH_SEED '{}', ignoring", seed);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rooms == 0 {
            return Err("max_rooms must be at least 1".to_string());
        }
        Ok(())
    }
}
