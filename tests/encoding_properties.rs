//! Property tests for feature encoding and prediction determinism

use churn_prediction::encoder::FeatureEncoder;
use churn_prediction::models::dispatcher;
use churn_prediction::types::record::fields;
use churn_prediction::{demo, ArtifactStore, ChurnLabel, CustomerRecord};
use proptest::prelude::*;
use std::sync::OnceLock;

fn store() -> &'static ArtifactStore {
    static STORE: OnceLock<ArtifactStore> = OnceLock::new();
    STORE.get_or_init(|| demo::store().unwrap())
}

fn yes_no() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Yes", "No"]).prop_map(str::to_string)
}

fn add_on() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Yes", "No", "No internet service"]).prop_map(str::to_string)
}

prop_compose! {
    fn services()(
        online_security in add_on(),
        online_backup in add_on(),
        device_protection in add_on(),
        tech_support in add_on(),
        streaming_tv in add_on(),
        streaming_movies in add_on(),
    ) -> [String; 6] {
        [
            online_security,
            online_backup,
            device_protection,
            tech_support,
            streaming_tv,
            streaming_movies,
        ]
    }
}

prop_compose! {
    fn customer()(
        senior_citizen in 0u8..=1,
        partner in yes_no(),
        dependents in yes_no(),
        tenure in 0u32..=72,
        multiple_lines in prop::sample::select(vec!["Yes", "No", "No phone service"]),
        internet_service in prop::sample::select(vec!["DSL", "Fiber optic", "No"]),
        add_ons in services(),
        contract in prop::sample::select(vec!["Month-to-month", "One year", "Two year"]),
        paperless_billing in yes_no(),
        payment_method in prop::sample::select(vec![
            "Electronic check",
            "Mailed check",
            "Bank transfer (automatic)",
            "Credit card (automatic)",
        ]),
        monthly_charges in 0.0f64..=120.0,
        total_charges in 0.0f64..=9000.0,
    ) -> CustomerRecord {
        let [
            online_security,
            online_backup,
            device_protection,
            tech_support,
            streaming_tv,
            streaming_movies,
        ] = add_ons;
        CustomerRecord {
            senior_citizen,
            partner,
            dependents,
            tenure,
            multiple_lines: multiple_lines.to_string(),
            internet_service: internet_service.to_string(),
            online_security,
            online_backup,
            device_protection,
            tech_support,
            streaming_tv,
            streaming_movies,
            contract: contract.to_string(),
            paperless_billing,
            payment_method: payment_method.to_string(),
            monthly_charges,
            total_charges,
        }
    }
}

fn encoder() -> FeatureEncoder<'static> {
    store().encoder()
}

proptest! {
    #[test]
    fn encoded_width_and_order_follow_schema(record in customer()) {
        let encoder = encoder();
        let schema = store().schema();
        let aligned = encoder.align(&record).unwrap();
        let encoded = encoder.encode(&record).unwrap();

        prop_assert_eq!(aligned.len(), schema.len());
        prop_assert_eq!(encoded.len(), schema.len());

        let at = |name: &str| aligned.as_slice()[schema.position(name).unwrap()];
        prop_assert_eq!(at(fields::TENURE), record.tenure as f64);
        prop_assert_eq!(at(fields::MONTHLY_CHARGES), record.monthly_charges);
        prop_assert_eq!(at(fields::SENIOR_CITIZEN), record.senior_citizen as f64);

        let fiber = at("InternetService_Fiber optic");
        prop_assert_eq!(fiber == 1.0, record.internet_service == "Fiber optic");
        let two_year = at("Contract_Two year");
        prop_assert_eq!(two_year == 1.0, record.contract == "Two year");
    }

    #[test]
    fn no_service_values_collapse_to_no(record in customer()) {
        let encoder = encoder();
        let mut collapsed = record.clone();
        for field in fields::INTERNET_ADD_ONS {
            collapsed.set_field(field, "No internet service").unwrap();
        }
        collapsed.set_field(fields::MULTIPLE_LINES, "No phone service").unwrap();

        let mut explicit = record;
        for field in fields::INTERNET_ADD_ONS {
            explicit.set_field(field, "No").unwrap();
        }
        explicit.set_field(fields::MULTIPLE_LINES, "No").unwrap();

        prop_assert_eq!(encoder.encode(&collapsed).unwrap(), encoder.encode(&explicit).unwrap());
    }

    #[test]
    fn zero_tenure_zeroes_total_charges(mut record in customer(), total in 0.0f64..=9000.0) {
        record.tenure = 0;
        record.total_charges = total;

        let aligned = encoder().align(&record).unwrap();
        let position = store().schema().position(fields::TOTAL_CHARGES).unwrap();
        prop_assert_eq!(aligned.as_slice()[position], 0.0);
    }

    #[test]
    fn predictions_are_deterministic_and_normalized(record in customer()) {
        let encoded = encoder().encode(&record).unwrap();
        for entry in store().registry().iter() {
            let classifier = entry.classifier.as_ref();
            let first = dispatcher::predict(&encoded, &entry.key, classifier).unwrap();
            let second = dispatcher::predict(&encoded, &entry.key, classifier).unwrap();

            prop_assert_eq!(first.label, second.label);
            prop_assert_eq!(
                first.probabilities.churn().to_bits(),
                second.probabilities.churn().to_bits()
            );

            let p = first.probabilities;
            prop_assert!((p.churn() + p.no_churn() - 1.0).abs() <= 1e-6);
            prop_assert_eq!(first.label == ChurnLabel::Churn, p.churn() >= 0.5);
        }
    }
}
