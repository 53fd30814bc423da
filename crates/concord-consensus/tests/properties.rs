use concord_consensus::{PassResult, resolve_consensus};
use concord_core::{Annotation, Attribution};
use proptest::prelude::*;

const LABELS: &[&str] = &["Motivation", "motivation!", "Frustration", "Work stress", "Stress"];

fn claim() -> impl Strategy<Value = Annotation> {
    (0usize..80, 1usize..40, 0..LABELS.len()).prop_map(|(start, len, label)| {
        Annotation::new("doc", LABELS[label], start, start + len, "span", Attribution::method("persona"))
    })
}

fn passes() -> impl Strategy<Value = Vec<PassResult>> {
    prop::collection::vec(prop::collection::vec(claim(), 0..6), 1..5).prop_map(|sets| {
        sets.into_iter()
            .enumerate()
            .map(|(i, anns)| PassResult::new(format!("p{i}"), anns))
            .collect()
    })
}

proptest! {
    #[test]
    fn resolution_is_idempotent(input in passes(), fraction in 0.05f64..=1.0) {
        let first = resolve_consensus(&input, Some(fraction)).unwrap();
        let second = resolve_consensus(&input, Some(fraction)).unwrap();
        prop_assert_eq!(&first, &second);
    }

    #[test]
    fn promoted_claims_meet_the_threshold(input in passes(), fraction in 0.05f64..=1.0) {
        let result = resolve_consensus(&input, Some(fraction)).unwrap();
        let required = result.required_passes as f64 / input.len() as f64;
        prop_assert!(result.annotations.len() <= result.total_claims);
        prop_assert!((0.0..=1.0).contains(&result.consensus_rate));
        for a in &result.annotations {
            let confidence = a.confidence.unwrap_or(0.0);
            prop_assert!(confidence >= required - 1e-9);
            prop_assert!(confidence <= 1.0);
        }
    }
}
