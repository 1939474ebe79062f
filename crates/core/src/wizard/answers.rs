use crate::domain::persona::{PersonaCatalog, RiskLevel};
use crate::domain::profile::{HoldingPeriod, InvestorProfile, DEFAULT_SCENARIO};
use anyhow::Context;
use serde::Serialize;

/// Session-scoped answers collected by the wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answers {
    /// Always a key of the catalog the wizard was built with.
    pub persona_key: String,
    pub scenario: String,
    pub risk: Option<RiskLevel>,
    pub holding: Option<HoldingPeriod>,
    pub industries: Vec<String>,
}

impl Answers {
    pub fn new(catalog: &PersonaCatalog) -> Self {
        Self {
            persona_key: catalog.default_key().to_string(),
            scenario: String::new(),
            risk: None,
            holding: None,
            industries: Vec::new(),
        }
    }

    /// Explicit choice if made, otherwise the persona's default.
    pub fn risk_or_default(&self, catalog: &PersonaCatalog) -> RiskLevel {
        self.risk.unwrap_or_else(|| {
            catalog
                .get(&self.persona_key)
                .map(|p| p.risk.prefill())
                .unwrap_or(RiskLevel::Moderate)
        })
    }

    pub fn holding_or_default(&self) -> HoldingPeriod {
        self.holding.unwrap_or_default()
    }

    /// Copy of the catalog persona with these answers applied. The catalog is untouched.
    pub fn merge_into(&self, catalog: &PersonaCatalog) -> anyhow::Result<InvestorProfile> {
        let persona = catalog
            .get(&self.persona_key)
            .with_context(|| format!("unknown persona key: {}", self.persona_key))?;

        let mut profile = InvestorProfile::from_persona(persona).with_scenario(&self.scenario);
        if let Some(risk) = self.risk {
            profile.risk_tolerance = risk;
        }
        profile.holding_period = self.holding;
        profile.preferred_industries = self.industries.clone();
        Ok(profile)
    }
}

/// What the review step shows before the results are generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub persona: String,
    pub goal: String,
    pub scenario: String,
    pub risk: RiskLevel,
    pub holding: HoldingPeriod,
    pub industries: String,
}

impl Answers {
    pub fn summary(&self, catalog: &PersonaCatalog) -> ReviewSummary {
        let persona = catalog.get(&self.persona_key);
        let scenario = self.scenario.trim();
        ReviewSummary {
            persona: persona.map_or_else(|| self.persona_key.clone(), |p| p.name.to_string()),
            goal: persona.map(|p| p.goal.to_string()).unwrap_or_default(),
            scenario: if scenario.is_empty() {
                DEFAULT_SCENARIO.to_string()
            } else {
                scenario.to_string()
            },
            risk: self.risk_or_default(catalog),
            holding: self.holding_or_default(),
            industries: if self.industries.is_empty() {
                "No preference".to_string()
            } else {
                self.industries.join(", ")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_default_persona() {
        let catalog = PersonaCatalog::builtin();
        let a = Answers::new(&catalog);
        assert_eq!(a.persona_key, "college_student");
        assert_eq!(a.risk_or_default(&catalog), RiskLevel::Moderate);
        assert_eq!(a.holding_or_default(), HoldingPeriod::ShortTerm);
    }

    #[test]
    fn merge_overrides_without_touching_catalog() {
        let catalog = PersonaCatalog::builtin();
        let mut a = Answers::new(&catalog);
        a.persona_key = "defensive_investor".to_string();
        a.risk = Some(RiskLevel::High);
        a.holding = Some(HoldingPeriod::LongTerm);
        a.industries = vec!["Utilities".to_string()];

        let p = a.merge_into(&catalog).unwrap();
        assert_eq!(p.name, "Defensive Investor");
        assert_eq!(p.risk_tolerance, RiskLevel::High);
        assert_eq!(p.scenario, DEFAULT_SCENARIO);
        assert_eq!(p.holding_period, Some(HoldingPeriod::LongTerm));
        assert_eq!(p.preferred_industries, vec!["Utilities"]);

        assert_eq!(catalog.get("defensive_investor").unwrap().risk, RiskLevel::Low);
    }

    #[test]
    fn merge_rejects_unknown_persona() {
        let catalog = PersonaCatalog::builtin();
        let mut a = Answers::new(&catalog);
        a.persona_key = "day_trader".to_string();
        assert!(a.merge_into(&catalog).is_err());
    }

    #[test]
    fn summary_fills_defaults() {
        let catalog = PersonaCatalog::builtin();
        let mut a = Answers::new(&catalog);
        a.persona_key = "scenario_planner".to_string();
        a.scenario = "   ".to_string();

        let s = a.summary(&catalog);
        assert_eq!(s.persona, "Scenario-Based Investor");
        assert_eq!(s.scenario, DEFAULT_SCENARIO);
        assert_eq!(s.risk, RiskLevel::Moderate);
        assert_eq!(s.holding, HoldingPeriod::ShortTerm);
        assert_eq!(s.industries, "No preference");

        a.industries = vec!["Energy".to_string(), "Finance".to_string()];
        assert_eq!(a.summary(&catalog).industries, "Energy, Finance");
    }
}
