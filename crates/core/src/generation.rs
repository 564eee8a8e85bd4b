use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Accepted sampling temperature
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Accepted reply length cap, in tokens
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 100..=2000;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Models the client is allowed to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[serde(rename = "openai/gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "openai/gpt-4o-mini")]
    Gpt4oMini,
}

impl Model {
    pub const VALUES: &'static [Model] = &[Model::Gpt35Turbo, Model::Gpt4oMini];

    /// Model id as sent to the endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Gpt35Turbo => "openai/gpt-3.5-turbo",
            Model::Gpt4oMini => "openai/gpt-4o-mini",
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Model::VALUES.iter().copied().find(|m| m.as_str() == wanted).ok_or_else(|| {
            let allowed: Vec<&str> = Model::VALUES.iter().map(Model::as_str).collect();
            Error::Validation(format!("unknown model '{}' (allowed: {})", s, allowed.join(", ")))
        })
    }
}

/// Per-request generation parameters
///
/// Out-of-range values are rejected rather than clamped, so a value that
/// made it into a `GenerationConfig` is always sent as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    model: Model,
    temperature: f32,
    max_tokens: u32,
}

impl GenerationConfig {
    pub fn new(model: Model, temperature: f32, max_tokens: u32) -> Result<Self> {
        validate_temperature(temperature)?;
        validate_max_tokens(max_tokens)?;
        Ok(Self { model, temperature, max_tokens })
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn set_model(&mut self, model: Model) {
        self.model = model;
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        validate_temperature(temperature)?;
        self.temperature = temperature;
        Ok(())
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<()> {
        validate_max_tokens(max_tokens)?;
        self.max_tokens = max_tokens;
        Ok(())
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Result<Self> {
        self.set_temperature(temperature)?;
        Ok(self)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Result<Self> {
        self.set_max_tokens(max_tokens)?;
        Ok(self)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { model: Model::default(), temperature: DEFAULT_TEMPERATURE, max_tokens: DEFAULT_MAX_TOKENS }
    }
}

fn validate_temperature(temperature: f32) -> Result<()> {
    // NaN fails `contains`
    if !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(Error::Validation(format!(
            "temperature {} is outside {}..={}",
            temperature,
            TEMPERATURE_RANGE.start(),
            TEMPERATURE_RANGE.end()
        )));
    }
    Ok(())
}

fn validate_max_tokens(max_tokens: u32) -> Result<()> {
    if !MAX_TOKENS_RANGE.contains(&max_tokens) {
        return Err(Error::Validation(format!(
            "max tokens {} is outside {}..={}",
            max_tokens,
            MAX_TOKENS_RANGE.start(),
            MAX_TOKENS_RANGE.end()
        )));
    }
    Ok(())
}
