use crate::domain::persona::{Persona, RiskLevel};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SCENARIO: &str = "balanced long-term growth";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum HoldingPeriod {
    #[default]
    #[serde(rename = "1-3 years")]
    ShortTerm,
    #[serde(rename = "4-7 years")]
    MidTerm,
    #[serde(rename = "10+ years")]
    LongTerm,
}

impl HoldingPeriod {
    pub const ALL: [HoldingPeriod; 3] = [
        HoldingPeriod::ShortTerm,
        HoldingPeriod::MidTerm,
        HoldingPeriod::LongTerm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HoldingPeriod::ShortTerm => "1-3 years",
            HoldingPeriod::MidTerm => "4-7 years",
            HoldingPeriod::LongTerm => "10+ years",
        }
    }
}

impl fmt::Display for HoldingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoldingPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown holding period: {s:?}"))
    }
}

/// A catalog persona with the session's answers layered on top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestorProfile {
    pub key: String,
    pub name: String,
    pub goal: String,
    pub description: String,
    pub scenario: String,
    pub risk_tolerance: RiskLevel,
    pub holding_period: Option<HoldingPeriod>,
    pub preferred_industries: Vec<String>,
}

impl InvestorProfile {
    /// Profile for a persona with no answers applied.
    pub fn from_persona(persona: &Persona) -> Self {
        Self {
            key: persona.key.to_string(),
            name: persona.name.to_string(),
            goal: persona.goal.to_string(),
            description: persona.description.to_string(),
            scenario: DEFAULT_SCENARIO.to_string(),
            risk_tolerance: persona.risk,
            holding_period: None,
            preferred_industries: Vec::new(),
        }
    }

    pub fn with_scenario(mut self, scenario: &str) -> Self {
        let scenario = scenario.trim();
        if !scenario.is_empty() {
            self.scenario = scenario.to_string();
        }
        self
    }
}
