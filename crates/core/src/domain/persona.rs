use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PERSONA_KEY: &str = "college_student";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[serde(rename = "very low")]
    VeryLow,
    Low,
    Moderate,
    High,
    Customizable,
}

impl RiskLevel {
    /// Levels a user can pick on the risk step.
    pub const SELECTABLE: [RiskLevel; 4] = [
        RiskLevel::VeryLow,
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "very low",
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Customizable => "customizable",
        }
    }

    pub fn is_selectable(self) -> bool {
        Self::SELECTABLE.contains(&self)
    }

    /// The value the risk step pre-fills for a persona whose catalog default is `self`.
    pub fn prefill(self) -> RiskLevel {
        if self.is_selectable() {
            self
        } else {
            RiskLevel::Moderate
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "very low" | "very_low" => Ok(RiskLevel::VeryLow),
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            "customizable" => Ok(RiskLevel::Customizable),
            other => anyhow::bail!("unknown risk level: {other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Persona {
    pub key: &'static str,
    pub name: &'static str,
    pub risk: RiskLevel,
    pub goal: &'static str,
    pub description: &'static str,
}

/// Read-only set of preset investor profiles.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    pub fn builtin() -> Self {
        Self {
            personas: vec![
                Persona {
                    key: "high_school_student",
                    name: "High School Student",
                    risk: RiskLevel::VeryLow,
                    goal: "learn the market and preserve capital",
                    description: "A first-time investor starting with a small amount of money. \
                        Wants safe exposure to the market and simple explanations. \
                        Prefers well-known index funds and avoids high volatility.",
                },
                Persona {
                    key: "college_student",
                    name: "College Student",
                    risk: RiskLevel::Moderate,
                    goal: "long-term balanced growth",
                    description: "A young investor with a long time horizon and willingness to take some risk \
                        for higher returns. Interested in tech, index funds, and learning how to build a portfolio.",
                },
                Persona {
                    key: "defensive_investor",
                    name: "Defensive Investor",
                    risk: RiskLevel::Low,
                    goal: "minimize downside during market volatility",
                    description: "Cautious about economic downturns. Invests in large, well-known companies that \
                        are stable and recession-resistant. Avoids complex sectors like energy and real estate. \
                        Prefers S&P 500 stocks and ETFs with strong fundamentals.",
                },
                Persona {
                    key: "long_term_holder",
                    name: "Long-Term Holder",
                    risk: RiskLevel::Moderate,
                    goal: "build wealth gradually with stable, proven companies",
                    description: "A disciplined investor focused on holding investments for many years. \
                        Believes in the long-term strength of the market. Values reliable growth \
                        over speculation and short-term gains.",
                },
                Persona {
                    key: "research_focused_investor",
                    name: "Research-Focused Investor",
                    risk: RiskLevel::Moderate,
                    goal: "make informed, evidence-based investment choices",
                    description: "Prefers to understand a company's fundamentals before investing. Looks at \
                        analyst reports, peer comparisons, index membership, and valuation data. \
                        Wants both pros and cons clearly explained before taking action.",
                },
                Persona {
                    key: "scenario_planner",
                    name: "Scenario-Based Investor",
                    risk: RiskLevel::Customizable,
                    goal: "build a portfolio tailored to specific conditions or themes",
                    description: "Wants the ability to specify scenarios like 'recession-proof' or 'tech-heavy' portfolios. \
                        Seeks tools that allow input on sectors, time horizon, and risk preferences, with \
                        transparent explanations behind each recommendation.",
                },
            ],
        }
    }

    pub fn get(&self, key: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    /// `college_student` when present, otherwise the first entry.
    pub fn default_key(&self) -> &'static str {
        if self.contains(DEFAULT_PERSONA_KEY) {
            return DEFAULT_PERSONA_KEY;
        }
        self.personas
            .first()
            .map(|p| p.key)
            .unwrap_or(DEFAULT_PERSONA_KEY)
    }
}
