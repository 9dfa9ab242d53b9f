use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

/// Whether the running score carries over from one quiz to the next within a
/// session, or starts over at zero. The per-quiz result persisted at the end
/// of each quiz always covers that quiz alone, under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorePolicy {
    #[default]
    Cumulative,
    PerQuiz,
}

impl FromStr for ScorePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cumulative" => Ok(ScorePolicy::Cumulative),
            "per_quiz" => Ok(ScorePolicy::PerQuiz),
            other => Err(Error::Config(format!(
                "Invalid SCORE_POLICY '{}': expected 'cumulative' or 'per_quiz'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub score_policy: ScorePolicy,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let score_policy = match env::var("SCORE_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => ScorePolicy::default(),
        };

        Ok(Self {
            database_url: get_env("DATABASE_URL")?,
            score_policy,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
