//! Runs classifiers on an encoded vector and normalizes their output

use crate::encoder::EncodedVector;
use crate::error::{ChurnError, Result};
use crate::models::classifier::Classifier;
use crate::models::registry::ModelRegistry;
use crate::types::{ChurnLabel, ClassProbabilities, Prediction};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Tolerance for `p(No) + p(Yes)` reported by a classifier
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Score one vector with one classifier.
///
/// The label always follows `p(Churn) >= 0.5`; a classifier whose own hard
/// label disagrees is logged and overruled.
pub fn predict(
    vector: &EncodedVector,
    name: &str,
    classifier: &dyn Classifier,
) -> Result<Prediction> {
    score(vector, classifier).map_err(|e| e.for_model(name)).map(|prediction| {
        debug!(
            model = %name,
            label = %prediction.label,
            p_churn = prediction.probabilities.churn(),
            "Prediction complete"
        );
        prediction
    })
}

fn score(vector: &EncodedVector, classifier: &dyn Classifier) -> Result<Prediction> {
    let family = classifier.family();

    if vector.len() != classifier.n_features() {
        return Err(ChurnError::inference(
            family,
            format!(
                "expected {} features, got {}",
                classifier.n_features(),
                vector.len()
            ),
        ));
    }

    let [p_no, p_yes] = classifier.predict_proba(vector.as_slice())?;

    if !p_no.is_finite() || !p_yes.is_finite() {
        return Err(ChurnError::inference(family, "non-finite probability"));
    }
    if !(0.0..=1.0).contains(&p_yes) || !(0.0..=1.0).contains(&p_no) {
        return Err(ChurnError::inference(
            family,
            format!("probability outside [0, 1]: [{p_no}, {p_yes}]"),
        ));
    }
    if (p_no + p_yes - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        warn!(family, p_no, p_yes, "Class probabilities do not sum to one, using p(Yes)");
    }

    let probabilities = ClassProbabilities::from_churn(p_yes);
    let label = ChurnLabel::from_probability(p_yes);

    let own_label = classifier.predict(vector.as_slice())?;
    if own_label != label {
        warn!(
            family,
            classifier_label = %own_label,
            p_churn = p_yes,
            "Classifier label disagrees with its probability, using the probability"
        );
    }

    Ok(Prediction {
        label,
        probabilities,
    })
}

/// Score one vector with every registered classifier, in parallel.
///
/// Results keep registry order and each model fails independently.
pub fn predict_all(
    vector: &EncodedVector,
    registry: &ModelRegistry,
) -> Vec<(String, Result<Prediction>)> {
    registry
        .entries()
        .par_iter()
        .map(|entry| {
            let result = predict(vector, &entry.key, entry.classifier.as_ref());
            if let Err(e) = &result {
                warn!(model = %entry.key, error = %e, "Model failed in comparison");
            }
            (entry.key.clone(), result)
        })
        .collect()
}
