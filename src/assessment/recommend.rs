use serde::Serialize;

pub const MODERATE_FROM: f64 = 30.0;
pub const HIGH_FROM: f64 = 70.0;

const LOW: &[&str] = &[
    "You're doing great! Maintain your healthy habits.",
    "Consider sharing your work-life balance strategies with colleagues.",
];

const MODERATE: &[&str] = &[
    "You're doing okay, but could use some improvements.",
    "Try to take more breaks during work hours.",
    "Consider reducing screen time in the evenings.",
];

const HIGH: &[&str] = &[
    "⚠️ Warning: You're at high risk of burnout!",
    "Prioritize taking time off if possible.",
    "Schedule a meeting with your manager to discuss workload.",
    "Make sure you're getting enough quality sleep.",
    "Try to incorporate short walks during your day.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn from_score(score: f64) -> Self {
        if score < MODERATE_FROM {
            RiskTier::Low
        } else if score < HIGH_FROM {
            RiskTier::Moderate
        } else {
            RiskTier::High
        }
    }

    pub fn recommendations(self) -> &'static [&'static str] {
        match self {
            RiskTier::Low => LOW,
            RiskTier::Moderate => MODERATE,
            RiskTier::High => HIGH,
        }
    }
}

pub fn recommend(score: f64) -> &'static [&'static str] {
    RiskTier::from_score(score).recommendations()
}
