use serde::Deserialize;

use crate::services::ScoringWeights;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL catalog URL; the in-memory store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// JSON seed for the in-memory store
    #[serde(default)]
    pub catalog_seed_path: Option<String>,

    /// Redis connection URL; suggestion caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Suggestion cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub suggestion_cache_ttl: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    #[serde(default = "default_genre_weight")]
    pub genre_weight: f64,

    #[serde(default = "default_cast_weight")]
    pub cast_weight: f64,

    #[serde(default = "default_year_weight")]
    pub year_weight: f64,

    /// Release-year distance at which year proximity reaches zero
    #[serde(default = "default_year_horizon")]
    pub year_horizon: u32,

    /// Minimum rating that counts as a liked movie
    #[serde(default = "default_like_threshold")]
    pub like_threshold: f64,

    /// Share of the final score taken from user affinity
    #[serde(default = "default_personalization_weight")]
    pub personalization_weight: f64,
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

fn default_genre_weight() -> f64 {
    0.6
}

fn default_cast_weight() -> f64 {
    0.3
}

fn default_year_weight() -> f64 {
    0.1
}

fn default_year_horizon() -> u32 {
    20
}

fn default_like_threshold() -> f64 {
    4.0
}

fn default_personalization_weight() -> f64 {
    0.3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            catalog_seed_path: None,
            redis_url: None,
            suggestion_cache_ttl: default_cache_ttl(),
            host: default_host(),
            port: default_port(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            genre_weight: default_genre_weight(),
            cast_weight: default_cast_weight(),
            year_weight: default_year_weight(),
            year_horizon: default_year_horizon(),
            like_threshold: default_like_threshold(),
            personalization_weight: default_personalization_weight(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            anyhow::bail!("Page sizes must be positive");
        }
        if self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "DEFAULT_PAGE_SIZE ({}) exceeds MAX_PAGE_SIZE ({})",
                self.default_page_size,
                self.max_page_size
            );
        }
        if !(0.0..=1.0).contains(&self.personalization_weight) {
            anyhow::bail!("PERSONALIZATION_WEIGHT must be within [0, 1]");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights {
            genre: self.genre_weight,
            cast: self.cast_weight,
            year: self.year_weight,
            year_horizon: self.year_horizon,
            like_threshold: self.like_threshold,
            personalization: self.personalization_weight,
        }
    }
}
