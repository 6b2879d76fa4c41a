//! Business interpretation of a churn prediction

use crate::types::{ChurnLabel, ClassProbabilities, Prediction};
use serde::{Deserialize, Serialize};

/// Lower bound of the "Very High" confidence tier
pub const VERY_HIGH_CONFIDENCE: f64 = 0.80;
/// Lower bound of the "High" confidence tier
pub const HIGH_CONFIDENCE: f64 = 0.60;
/// Churn probability above which outreach becomes urgent
pub const URGENT_CHURN_PROBABILITY: f64 = 0.80;

/// Confidence tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    High,
    VeryHigh,
}

impl ConfidenceTier {
    /// Determine the tier from `max(p)`; bounds are inclusive.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= VERY_HIGH_CONFIDENCE {
            ConfidenceTier::VeryHigh
        } else if confidence >= HIGH_CONFIDENCE {
            ConfidenceTier::High
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceTier::VeryHigh => "Very High",
            ConfidenceTier::High => "High",
            ConfidenceTier::Low => "Low",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk framing shown next to the label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFraming {
    HighRisk,
    Safe,
}

impl RiskFraming {
    pub fn from_label(label: ChurnLabel) -> Self {
        match label {
            ChurnLabel::Churn => RiskFraming::HighRisk,
            ChurnLabel::NoChurn => RiskFraming::Safe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskFraming::HighRisk => "High Risk",
            RiskFraming::Safe => "Safe",
        }
    }
}

/// Recommended retention action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPlan {
    UrgentOutreach,
    Preventive,
    RetentionUpsell,
}

impl ActionPlan {
    pub fn from_prediction(label: ChurnLabel, p_churn: f64) -> Self {
        match label {
            ChurnLabel::Churn if p_churn > URGENT_CHURN_PROBABILITY => ActionPlan::UrgentOutreach,
            ChurnLabel::Churn => ActionPlan::Preventive,
            ChurnLabel::NoChurn => ActionPlan::RetentionUpsell,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ActionPlan::UrgentOutreach => "Urgent action required",
            ActionPlan::Preventive => "Preventive action recommended",
            ActionPlan::RetentionUpsell => "Retention and upsell opportunity",
        }
    }

    /// Advisory steps, in order
    pub fn steps(self) -> &'static [&'static str] {
        match self {
            ActionPlan::UrgentOutreach => &[
                "Contact the customer within 24 hours",
                "Offer a special promotion or discount",
                "Schedule a consultation call",
                "Review the services in use and propose adjustments",
            ],
            ActionPlan::Preventive => &[
                "Send a personalised offer by email",
                "Run a customer satisfaction survey",
                "Propose a plan upgrade with extra benefits",
            ],
            ActionPlan::RetentionUpsell => &[
                "Loyal customer: keep the service quality high",
                "Offer an upgrade or add-on services",
                "Ask for referrals",
            ],
        }
    }
}

/// A prediction with its business interpretation attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Registry key of the model that produced the prediction
    pub model: String,
    pub label: ChurnLabel,
    pub probabilities: ClassProbabilities,
    /// `max(p(No), p(Yes))`
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub risk: RiskFraming,
    pub action: ActionPlan,
}

impl PredictionResult {
    pub fn p_churn(&self) -> f64 {
        self.probabilities.churn()
    }

    pub fn p_no_churn(&self) -> f64 {
        self.probabilities.no_churn()
    }
}

/// Attach tier, framing and action plan to a raw prediction.
pub fn interpret(model: &str, prediction: &Prediction) -> PredictionResult {
    let confidence = prediction.probabilities.confidence();
    PredictionResult {
        model: model.to_string(),
        label: prediction.label,
        probabilities: prediction.probabilities,
        confidence,
        tier: ConfidenceTier::from_confidence(confidence),
        risk: RiskFraming::from_label(prediction.label),
        action: ActionPlan::from_prediction(prediction.label, prediction.probabilities.churn()),
    }
}
