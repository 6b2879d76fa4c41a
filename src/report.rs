//! Plain-text rendering of predictions, comparisons and the email template

use crate::config::ArtifactsConfig;
use crate::encoder::EncodedVector;
use crate::export::percent;
use crate::interpret::{PredictionResult, URGENT_CHURN_PROBABILITY};
use crate::models::{ComparisonReport, ModelRegistry};
use crate::types::{ChurnLabel, CustomerRecord};
use std::fmt::Write;

/// Single-model result block
pub fn render_prediction(result: &PredictionResult, display_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Model:       {display_name}");
    let _ = writeln!(
        out,
        "Prediction:  {} ({})",
        result.label,
        result.risk.label()
    );
    let _ = writeln!(
        out,
        "Confidence:  {} [{}]",
        percent(result.confidence),
        result.tier
    );
    let _ = writeln!(out, "P(Churn):    {}", percent(result.p_churn()));
    let _ = writeln!(out, "P(No Churn): {}", percent(result.p_no_churn()));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}:", result.action.title());
    for step in result.action.steps() {
        let _ = writeln!(out, "  - {step}");
    }
    out
}

/// Side-by-side model verdicts followed by consensus figures
pub fn render_comparison(report: &ComparisonReport, registry: &ModelRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<26}{:>10}{:>12}{:>11}{:>11}",
        "Model", "Label", "Confidence", "Tier", "P(Churn)"
    );
    for result in &report.results {
        let name = registry
            .get(&result.model)
            .map(|e| e.display_name.as_str())
            .unwrap_or(result.model.as_str());
        let _ = writeln!(
            out,
            "{:<26}{:>10}{:>12}{:>11}{:>11}",
            name,
            result.label.as_str(),
            percent(result.confidence),
            result.tier.label(),
            percent(result.p_churn())
        );
    }
    for failure in &report.failures {
        let _ = writeln!(out, "{:<26}  failed: {}", failure.model, failure.error);
    }

    match &report.consensus {
        Some(c) => {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Consensus:        {} ({} of models vote churn)",
                c.majority(),
                percent(c.churn_vote_share)
            );
            let _ = writeln!(out, "Mean P(Churn):    {}", percent(c.mean_churn));
            let _ = writeln!(out, "Median P(Churn):  {}", percent(c.median_churn));
            let _ = writeln!(
                out,
                "Range:            {} .. {}",
                percent(c.min_churn),
                percent(c.max_churn)
            );
            let _ = writeln!(out, "Model agreement:  {}", percent(c.agreement));
        }
        None => {
            let _ = writeln!(out, "\nNo model produced a prediction.");
        }
    }
    out
}

/// The `models` command listing, read from configuration so it works
/// without loaded artifacts
pub fn render_catalog(artifacts: &ArtifactsConfig) -> String {
    let mut out = String::new();
    for model in &artifacts.models {
        let marker = if model.key == artifacts.default_model {
            " (default)"
        } else {
            ""
        };
        let _ = writeln!(out, "{} [{}]{}", model.display_name, model.key, marker);
        let _ = writeln!(out, "  {}", model.description);
        let _ = writeln!(out, "  Strength: {}", model.strength);
        let _ = writeln!(out, "  Artifact: {}", model.file);
    }
    out
}

/// Encoded vector listed against its column names
pub fn render_features(names: &[String], encoded: &EncodedVector) -> String {
    let width = names.iter().map(String::len).max().unwrap_or(0);
    let mut out = String::new();
    for (i, (name, value)) in names.iter().zip(encoded.as_slice()).enumerate() {
        let _ = writeln!(out, "{:>3}  {:<width$}  {:>10.4}", i, name, value);
    }
    out
}

/// Customer-facing email draft for the account team
pub fn email_template(result: &PredictionResult, record: &CustomerRecord) -> String {
    let mut out = String::new();
    match result.label {
        ChurnLabel::Churn => {
            let priority = if result.p_churn() > URGENT_CHURN_PROBABILITY {
                "Priority contact within 24 hours"
            } else {
                "Proactive outreach recommended"
            };
            let _ = writeln!(out, "Subject: Urgent: Customer Retention Required");
            let _ = writeln!(out);
            let _ = writeln!(out, "Dear Account Manager,");
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Our churn model flags this customer as likely to leave."
            );
            let _ = writeln!(out);
            let _ = writeln!(out, "Customer details:");
            let _ = writeln!(out, "- Risk Level: {}", percent(result.confidence));
            let _ = writeln!(out, "- Churn Probability: {}", percent(result.p_churn()));
            let _ = writeln!(out, "- Tenure: {} months", record.tenure);
            let _ = writeln!(out, "- Monthly Charges: ${:.2}", record.monthly_charges);
            let _ = writeln!(out, "- Contract: {}", record.contract);
            let _ = writeln!(out);
            let _ = writeln!(out, "Recommended actions:");
            let _ = writeln!(out, "1. {priority}");
            let _ = writeln!(out, "2. Offer retention incentives");
            let _ = writeln!(out, "3. Review service satisfaction");
        }
        ChurnLabel::NoChurn => {
            let _ = writeln!(out, "Subject: Customer Loyalty Opportunity");
            let _ = writeln!(out);
            let _ = writeln!(out, "Dear Account Manager,");
            let _ = writeln!(out);
            let _ = writeln!(out, "This customer shows strong loyalty signals.");
            let _ = writeln!(out);
            let _ = writeln!(out, "Customer details:");
            let _ = writeln!(out, "- Loyalty Score: {}", percent(result.p_no_churn()));
            let _ = writeln!(out, "- Tenure: {} months", record.tenure);
            let _ = writeln!(out, "- Monthly Charges: ${:.2}", record.monthly_charges);
            let _ = writeln!(out);
            let _ = writeln!(out, "Opportunities:");
            let _ = writeln!(out, "1. Consider upselling premium services");
            let _ = writeln!(out, "2. Ask for referrals");
            let _ = writeln!(out, "3. Maintain excellent service");
        }
    }
    let _ = writeln!(out);
    let _ = write!(out, "Best regards,\nCustomer Success Team");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::demo;
    use crate::interpret::interpret;
    use crate::types::{ClassProbabilities, Prediction};

    fn result(p_churn: f64) -> PredictionResult {
        interpret(
            "xgboost",
            &Prediction {
                label: ChurnLabel::from_probability(p_churn),
                probabilities: ClassProbabilities::from_churn(p_churn),
            },
        )
    }

    #[test]
    fn test_prediction_block() {
        let text = render_prediction(&result(0.75), "XGBoost");
        assert!(text.contains("Prediction:  CHURN (High Risk)"));
        assert!(text.contains("Confidence:  75.00% [High]"));
        assert!(text.contains("Preventive action recommended"));
    }

    #[test]
    fn test_email_priority_line() {
        let record = demo::sample_record();
        let urgent = email_template(&result(0.9), &record);
        assert!(urgent.starts_with("Subject: Urgent: Customer Retention Required"));
        assert!(urgent.contains("Priority contact within 24 hours"));
        assert!(urgent.contains("- Contract: One year"));

        let moderate = email_template(&result(0.8), &record);
        assert!(moderate.contains("Proactive outreach recommended"));
    }

    #[test]
    fn test_email_loyalty() {
        let record = demo::sample_record();
        let text = email_template(&result(0.2), &record);
        assert!(text.starts_with("Subject: Customer Loyalty Opportunity"));
        assert!(text.contains("- Loyalty Score: 80.00%"));
        assert!(text.contains("- Tenure: 24 months"));
        assert!(!text.contains("Contract"));
    }

    #[test]
    fn test_catalog_marks_default() {
        let artifacts = AppConfig::default().artifacts;
        let text = render_catalog(&artifacts);
        assert!(text.contains("[xgboost] (default)"));
        assert_eq!(text.matches("(default)").count(), 1);
        assert_eq!(text.matches("Strength:").count(), artifacts.models.len());
    }

    #[test]
    fn test_features_listing() {
        let names = vec!["tenure".to_string(), "MonthlyCharges".to_string()];
        let text = render_features(&names, &EncodedVector::new(vec![0.5, -1.25]));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("MonthlyCharges"));
        assert!(lines[1].ends_with("-1.2500"));
    }
}
