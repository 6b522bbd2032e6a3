//! End-to-end pipeline tests
//!
//! These run the full form → predict → session → presenter path against the
//! shipped iris bundle and against small hand-built bundles.

#[cfg(test)]
mod pipeline_tests {
    use crate::artifact::{
        parse_bundle, ArtifactLoader, IdentityScaler, LoadFailure, LogisticRegression,
        ModelBundle, MultiClass, StandardScaler,
    };
    use crate::form::MeasurementForm;
    use crate::models::{MeasurementField, MeasurementRecord};
    use crate::predictor::{
        argmax, predict, Classifier, InferenceFailure, PredictError, TransformFailure,
    };
    use crate::presenter::{format_confidence, HistoryTable, SuccessNotice};
    use crate::session::Session;
    use std::path::Path;
    use tempfile::TempDir;

    const IRIS_BUNDLE_JSON: &str = include_str!("../../../../ml/ML_items");
    const IRIS_ONNX: &[u8] = include_bytes!("../../testdata/iris_classifier.onnx");

    fn iris_bundle() -> ModelBundle {
        parse_bundle(IRIS_BUNDLE_JSON.as_bytes(), Path::new("ml/ML_items")).unwrap()
    }

    /// Classifier that always returns the same distribution
    struct FixedClassifier(Vec<f64>);

    impl Classifier for FixedClassifier {
        fn num_classes(&self) -> usize {
            self.0.len()
        }

        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, InferenceFailure> {
            Ok(self.0.clone())
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn num_classes(&self) -> usize {
            3
        }

        fn kind(&self) -> &'static str {
            "failing"
        }

        fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, InferenceFailure> {
            Err(InferenceFailure::Runtime("model exploded".to_string()))
        }
    }

    fn fixed_bundle(probabilities: Vec<f64>) -> ModelBundle {
        ModelBundle::new(
            Box::new(StandardScaler::new(vec![0.0; 4], vec![1.0; 4])),
            Box::new(FixedClassifier(probabilities)),
        )
    }

    #[test]
    fn test_setosa_scenario() {
        let bundle = iris_bundle();
        let result = predict(&MeasurementRecord::new(5.1, 3.5, 1.4, 0.2), &bundle).unwrap();
        assert_eq!(result.predicted_class, 0);
        assert!(result.confidence_score > 0.9, "confidence {}", result.confidence_score);
        assert_eq!(result.class_label.as_deref(), Some("setosa"));
    }

    #[test]
    fn test_versicolor_and_virginica() {
        let bundle = iris_bundle();
        let versicolor = predict(&MeasurementRecord::new(5.9, 2.8, 4.3, 1.3), &bundle).unwrap();
        let virginica = predict(&MeasurementRecord::new(6.7, 3.0, 5.2, 2.3), &bundle).unwrap();
        assert_eq!(versicolor.predicted_class, 1);
        assert_eq!(virginica.predicted_class, 2);
    }

    #[test]
    fn test_outputs_are_in_range_for_odd_inputs() {
        let bundle = iris_bundle();
        let inputs = [
            MeasurementRecord::default(),
            MeasurementRecord::new(-5.0, -1.0, -3.0, -0.5),
            MeasurementRecord::new(100.0, 0.0, 250.0, 80.0),
            MeasurementRecord::new(1e-9, 1e9, 0.5, 3.3),
        ];
        for record in inputs {
            let result = predict(&record, &bundle).unwrap();
            assert!(result.predicted_class < bundle.num_classes());
            assert!((0.0..=1.0).contains(&result.confidence_score));
        }
    }

    #[test]
    fn test_record_round_trips_through_result() {
        let bundle = iris_bundle();
        let record = MeasurementRecord::new(4.4, 2.9, 1.4, 0.2);
        let result = predict(&record, &bundle).unwrap();
        assert_eq!(result.record(), record);
    }

    #[test]
    fn test_confidence_is_max_probability() {
        let bundle = fixed_bundle(vec![0.1, 0.7, 0.2]);
        let result = predict(&MeasurementRecord::default(), &bundle).unwrap();
        assert_eq!(result.predicted_class, 1);
        assert_eq!(result.confidence_score, 0.7);
    }

    #[test]
    fn test_tie_goes_to_lower_index() {
        let bundle = fixed_bundle(vec![0.2, 0.4, 0.4]);
        let result = predict(&MeasurementRecord::default(), &bundle).unwrap();
        assert_eq!(result.predicted_class, 1);

        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.1, 0.3, 0.3, 0.3]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_non_finite_probability_is_inference_failure() {
        let bundle = fixed_bundle(vec![0.5, f64::NAN]);
        let err = predict(&MeasurementRecord::default(), &bundle).unwrap_err();
        assert_eq!(err, PredictError::Inference(InferenceFailure::NonFinite { class: 1 }));
    }

    #[test]
    fn test_empty_distribution_is_inference_failure() {
        let bundle = fixed_bundle(vec![]);
        let err = predict(&MeasurementRecord::default(), &bundle).unwrap_err();
        assert_eq!(err, PredictError::Inference(InferenceFailure::EmptyOutput));
    }

    #[test]
    fn test_scaler_width_mismatch_is_transform_failure() {
        let bundle = ModelBundle::new(
            Box::new(StandardScaler::new(vec![0.0; 3], vec![1.0; 3])),
            Box::new(FixedClassifier(vec![1.0])),
        );
        let err = predict(&MeasurementRecord::default(), &bundle).unwrap_err();
        assert_eq!(err, PredictError::Transform(TransformFailure { expected: 3, got: 4 }));
    }

    #[test]
    fn test_classifier_width_mismatch_is_inference_failure() {
        let model = LogisticRegression::new(
            vec![vec![1.0; 5], vec![0.0; 5]],
            vec![0.0, 0.0],
            MultiClass::Multinomial,
        )
        .unwrap();
        let bundle = ModelBundle::new(Box::new(IdentityScaler::new(4)), Box::new(model));
        let err = predict(&MeasurementRecord::default(), &bundle).unwrap_err();
        assert!(matches!(
            err,
            PredictError::Inference(InferenceFailure::FeatureMismatch { expected: 5, got: 4 })
        ));
    }

    #[test]
    fn test_failed_prediction_leaves_history_unchanged() {
        let good = iris_bundle();
        let bad = ModelBundle::new(
            Box::new(StandardScaler::new(vec![0.0; 4], vec![1.0; 4])),
            Box::new(FailingClassifier),
        );
        let mut session = Session::new();

        session.submit(&MeasurementRecord::new(5.1, 3.5, 1.4, 0.2), &good).unwrap();
        let err = session.submit(&MeasurementRecord::default(), &bad).unwrap_err();

        assert!(matches!(err, PredictError::Inference(InferenceFailure::Runtime(_))));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_history_grows_by_one_per_submission() {
        let bundle = iris_bundle();
        let mut session = Session::new();
        for n in 1..=25 {
            let record = MeasurementRecord::new(n as f64 * 0.3, 3.0, n as f64 * 0.2, 1.0);
            session.submit(&record, &bundle).unwrap();
            assert_eq!(session.history().len(), n);
        }
    }

    #[test]
    fn test_three_submissions_scenario() {
        let bundle = iris_bundle();
        let mut session = Session::new();
        let mut form = MeasurementForm::new();
        let inputs = [
            ["5.1", "3.5", "1.4", "0.2"],
            ["5.9", "2.8", "4.3", "1.3"],
            ["6.7", "3.0", "5.2", "2.3"],
        ];

        let mut expected = Vec::new();
        for values in inputs {
            for (field, value) in MeasurementField::ALL.into_iter().zip(values) {
                form.set(field, value);
            }
            let record = form.submit().unwrap();
            assert!(form.is_blank());

            let direct = predict(&record, &bundle).unwrap();
            let stored = session.submit(&record, &bundle).unwrap().clone();
            assert_eq!(stored, direct);

            let notice = SuccessNotice::from(&stored);
            assert!(notice.class_line().starts_with("Predicted class: "));
            expected.push(direct);
        }

        let table = HistoryTable::from_history(session.history().all());
        assert_eq!(table.len(), 3);
        for (row, result) in table.rows().iter().zip(&expected) {
            assert_eq!(row.predicted_class, result.predicted_class.to_string());
            assert_eq!(row.confidence_score, format_confidence(result.confidence_score));
            assert_eq!(row.sepal_length, result.sepal_length.to_string());
        }
        let classes: Vec<&str> = table.rows().iter().map(|r| r.predicted_class.as_str()).collect();
        assert_eq!(classes, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_two_loads_behave_identically() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ML_items");
        std::fs::write(&path, IRIS_BUNDLE_JSON).unwrap();

        let first = ArtifactLoader::new(&path).load_bundle().unwrap();
        let second = ArtifactLoader::new(&path).load_bundle().unwrap();
        assert_eq!(first.version, second.version);

        let record = MeasurementRecord::new(6.1, 2.9, 4.7, 1.4);
        assert_eq!(
            predict(&record, &first).unwrap(),
            predict(&record, &second).unwrap()
        );
    }

    #[test]
    fn test_empty_artifact_prevents_prediction() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ML_items");
        std::fs::write(&path, "").unwrap();

        let loader = ArtifactLoader::new(&path);
        let err = loader.load_bundle().unwrap_err();
        assert!(matches!(err, LoadFailure::Malformed { .. }));
        assert!(!loader.is_loaded());
    }

    /// The shipped bundle with its classifier swapped for the exported ONNX graph
    fn write_onnx_bundle(dir: &Path) -> std::path::PathBuf {
        std::fs::write(dir.join("iris_classifier.onnx"), IRIS_ONNX).unwrap();

        let mut bundle: serde_json::Value = serde_json::from_str(IRIS_BUNDLE_JSON).unwrap();
        bundle["model"] = serde_json::json!({
            "kind": "onnx",
            "path": "iris_classifier.onnx",
            "n_features": 4
        });
        let path = dir.join("ML_items");
        std::fs::write(&path, serde_json::to_vec(&bundle).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_onnx_bundle_agrees_with_linear_bundle() {
        let dir = TempDir::new().unwrap();
        let onnx = ArtifactLoader::new(write_onnx_bundle(dir.path()))
            .load_bundle()
            .unwrap();
        let linear = iris_bundle();

        assert_eq!(onnx.model.kind(), "onnx");
        assert_eq!(onnx.num_classes(), 3);

        let records = [
            MeasurementRecord::new(5.1, 3.5, 1.4, 0.2),
            MeasurementRecord::new(5.9, 2.8, 4.3, 1.3),
            MeasurementRecord::new(6.7, 3.0, 5.2, 2.3),
        ];
        for record in records {
            let expected = predict(&record, &linear).unwrap();
            let result = predict(&record, &onnx).unwrap();
            assert_eq!(result.predicted_class, expected.predicted_class);
            assert_eq!(result.class_label, expected.class_label);
            assert!((result.confidence_score - expected.confidence_score).abs() < 1e-4);
        }
    }

    #[test]
    fn test_onnx_bundle_with_missing_graph_fails_to_load() {
        let dir = TempDir::new().unwrap();
        let path = write_onnx_bundle(dir.path());
        std::fs::remove_file(dir.path().join("iris_classifier.onnx")).unwrap();

        let err = ArtifactLoader::new(path).load_bundle().unwrap_err();
        assert!(matches!(err, LoadFailure::Onnx { .. }), "got {:?}", err);
    }
}
