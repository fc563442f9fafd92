use crate::FlowError;
use secrecy::SecretString;

pub const DEFAULT_BASE_URL: &str = "https://flow.polar.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub username: String,
    pub password: SecretString,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, FlowError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Read configuration through the provided lookup, so tests never touch
    /// the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, FlowError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let username = get("POLAR_FLOW_USERNAME")
            .ok_or_else(|| FlowError::Config("POLAR_FLOW_USERNAME missing".into()))?;
        let password = get("POLAR_FLOW_PASSWORD")
            .ok_or_else(|| FlowError::Config("POLAR_FLOW_PASSWORD missing".into()))?;
        let base_url = get("POLAR_FLOW_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Ok(Self {
            username,
            password: SecretString::new(password.into()),
            base_url,
        })
    }
}
