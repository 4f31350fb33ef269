use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::repository::MonthBoundary;
use crate::schema::{EntryInputs, DEFAULT_BUN_PRICE, DEFAULT_OWNER_SHARE, DEFAULT_PARTNER_SHARE};

pub const DEFAULT_INSIGHT_MODEL: &str = "gemini-3-flash-preview";

/// Values a fresh entry form starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDefaults {
    pub price_per_bun: f64,
    pub owner_share_percent: u8,
    pub partner_share_percent: u8,
}

impl Default for EntryDefaults {
    fn default() -> Self {
        Self {
            price_per_bun: DEFAULT_BUN_PRICE,
            owner_share_percent: DEFAULT_OWNER_SHARE,
            partner_share_percent: DEFAULT_PARTNER_SHARE,
        }
    }
}

impl EntryDefaults {
    pub fn blank_inputs(&self) -> EntryInputs {
        EntryInputs::with_defaults(
            self.price_per_bun,
            self.owner_share_percent,
            self.partner_share_percent,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    DEFAULT_INSIGHT_MODEL.to_string()
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    #[serde(default)]
    pub defaults: EntryDefaults,
    #[serde(default)]
    pub month_boundary: MonthBoundary,
    #[serde(default)]
    pub insight: InsightSettings,
}

impl TrackerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads overrides from the environment on top of the defaults.
    ///
    /// Recognised variables: `BUNTEE_DEFAULT_PRICE`, `BUNTEE_OWNER_SHARE`,
    /// `BUNTEE_MONTH_BOUNDARY`, `GEMINI_API_KEY`, `GEMINI_MODEL`. The owner
    /// share also sets the partner share to the remainder.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("BUNTEE_DEFAULT_PRICE") {
            config.defaults.price_per_bun = raw.trim().parse().map_err(|_| {
                TrackerError::InvalidConfig(format!("BUNTEE_DEFAULT_PRICE is not a number: {}", raw))
            })?;
        }

        if let Some(raw) = lookup("BUNTEE_OWNER_SHARE") {
            let owner: u8 = raw.trim().parse().map_err(|_| {
                TrackerError::InvalidConfig(format!("BUNTEE_OWNER_SHARE is not a percentage: {}", raw))
            })?;
            if owner > 100 {
                return Err(TrackerError::InvalidConfig(format!(
                    "BUNTEE_OWNER_SHARE must be between 0 and 100, got {}",
                    owner
                )));
            }
            config.defaults.owner_share_percent = owner;
            config.defaults.partner_share_percent = 100 - owner;
        }

        if let Some(raw) = lookup("BUNTEE_MONTH_BOUNDARY") {
            config.month_boundary = MonthBoundary::parse(&raw)?;
        }

        config.insight.api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        if let Some(model) = lookup("GEMINI_MODEL") {
            config.insight.model = model;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.defaults;

        if !d.price_per_bun.is_finite() || d.price_per_bun < 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "Default price per bun must be a non-negative number, got {}",
                d.price_per_bun
            )));
        }

        if d.owner_share_percent > 100 || d.partner_share_percent > 100 {
            return Err(TrackerError::InvalidConfig(format!(
                "Shares must be between 0 and 100, got {}/{}",
                d.owner_share_percent, d.partner_share_percent
            )));
        }

        if u16::from(d.owner_share_percent) + u16::from(d.partner_share_percent) != 100 {
            return Err(TrackerError::InvalidConfig(format!(
                "Default shares must sum to 100, got {}/{}",
                d.owner_share_percent, d.partner_share_percent
            )));
        }

        if self.insight.model.trim().is_empty() {
            return Err(TrackerError::InvalidConfig(
                "Insight model name is empty".to_string(),
            ));
        }

        Ok(())
    }
}
