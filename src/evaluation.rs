//! Held-out test metrics recorded when the shipped models were trained

use serde::Serialize;
use std::fmt;

/// Per-class row of a classification report
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u32,
}

/// Test-set metrics for one model; headline figures are for Churn = Yes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelEvaluation {
    pub model: &'static str,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub no: ClassMetrics,
    pub yes: ClassMetrics,
}

/// Test split: 1031 retained, 370 churned.
pub const EVALUATIONS: [ModelEvaluation; 4] = [
    ModelEvaluation {
        model: "XGBoost",
        accuracy: 0.8009,
        precision: 0.61,
        recall: 0.68,
        f1: 0.64,
        no: ClassMetrics {
            precision: 0.88,
            recall: 0.84,
            f1: 0.86,
            support: 1031,
        },
        yes: ClassMetrics {
            precision: 0.61,
            recall: 0.68,
            f1: 0.64,
            support: 370,
        },
    },
    ModelEvaluation {
        model: "Logistic Regression",
        accuracy: 0.7495,
        precision: 0.52,
        recall: 0.80,
        f1: 0.63,
        no: ClassMetrics {
            precision: 0.91,
            recall: 0.73,
            f1: 0.81,
            support: 1031,
        },
        yes: ClassMetrics {
            precision: 0.52,
            recall: 0.80,
            f1: 0.63,
            support: 370,
        },
    },
    ModelEvaluation {
        model: "Random Forest",
        accuracy: 0.7802,
        precision: 0.58,
        recall: 0.59,
        f1: 0.59,
        no: ClassMetrics {
            precision: 0.85,
            recall: 0.85,
            f1: 0.85,
            support: 1031,
        },
        yes: ClassMetrics {
            precision: 0.58,
            recall: 0.59,
            f1: 0.59,
            support: 370,
        },
    },
    ModelEvaluation {
        model: "Support Vector Machine",
        accuracy: 0.7545,
        precision: 0.53,
        recall: 0.72,
        f1: 0.61,
        no: ClassMetrics {
            precision: 0.88,
            recall: 0.77,
            f1: 0.82,
            support: 1031,
        },
        yes: ClassMetrics {
            precision: 0.53,
            recall: 0.72,
            f1: 0.61,
            support: 370,
        },
    },
];

/// Metric columns of the comparison table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Accuracy,
    Precision,
    Recall,
    F1,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Accuracy, Metric::Precision, Metric::Recall, Metric::F1];

    pub fn of(self, eval: &ModelEvaluation) -> f64 {
        match self {
            Metric::Accuracy => eval.accuracy,
            Metric::Precision => eval.precision,
            Metric::Recall => eval.recall,
            Metric::F1 => eval.f1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Accuracy => "Accuracy",
            Metric::Precision => "Precision",
            Metric::Recall => "Recall",
            Metric::F1 => "F1",
        }
    }
}

/// Models ranked by F1 for Churn = Yes, best first.
#[derive(Debug, Clone)]
pub struct EvaluationTable {
    rows: Vec<ModelEvaluation>,
}

impl EvaluationTable {
    pub fn new(mut rows: Vec<ModelEvaluation>) -> Self {
        rows.sort_by(|a, b| b.f1.total_cmp(&a.f1));
        Self { rows }
    }

    pub fn rows(&self) -> &[ModelEvaluation] {
        &self.rows
    }

    /// Highest value in a metric column
    pub fn best(&self, metric: Metric) -> Option<f64> {
        self.rows.iter().map(|r| metric.of(r)).max_by(f64::total_cmp)
    }

    /// Whether a row holds the column's best value
    pub fn is_best(&self, row: &ModelEvaluation, metric: Metric) -> bool {
        self.best(metric) == Some(metric.of(row))
    }
}

impl Default for EvaluationTable {
    fn default() -> Self {
        Self::new(EVALUATIONS.to_vec())
    }
}

impl fmt::Display for EvaluationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<6}{:<24}", "Rank", "Model")?;
        for metric in Metric::ALL {
            write!(f, "{:>12}", metric.label())?;
        }
        writeln!(f)?;

        for (rank, row) in self.rows.iter().enumerate() {
            write!(f, "{:<6}{:<24}", rank + 1, row.model)?;
            for metric in Metric::ALL {
                let value = match metric {
                    Metric::Accuracy => format!("{:.4}", metric.of(row)),
                    _ => format!("{:.2}", metric.of(row)),
                };
                let marker = if self.is_best(row, metric) { "*" } else { " " };
                write!(f, "{:>11}{}", value, marker)?;
            }
            writeln!(f)?;
        }
        write!(f, "* best in column")
    }
}

impl fmt::Display for ModelEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.model)?;
        writeln!(
            f,
            "{:>12}{:>11}{:>10}{:>10}{:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (name, m) in [("No", self.no), ("Yes", self.yes)] {
            writeln!(
                f,
                "{:>12}{:>11.2}{:>10.2}{:>10.2}{:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        write!(
            f,
            "{:>12}{:>31.2}{:>10}",
            "accuracy",
            self.accuracy,
            self.no.support + self.yes.support
        )
    }
}
