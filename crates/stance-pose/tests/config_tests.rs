use stance_pose::{ClassifierTuning, ConfidenceMode, ConfidenceThresholds, ConfigError};

#[test]
fn test_default_thresholds() {
    let thresholds = ConfidenceThresholds::default();
    assert_eq!(thresholds.for_mode(ConfidenceMode::Normal), 0.3);
    assert_eq!(thresholds.for_mode(ConfidenceMode::Debug), 0.1);
    assert!(thresholds.validate().is_ok());
}

#[test]
fn test_debug_threshold_above_normal_is_invalid() {
    let thresholds = ConfidenceThresholds { normal: 0.2, debug: 0.4 };
    assert!(matches!(thresholds.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_threshold_out_of_range_is_invalid() {
    let thresholds = ConfidenceThresholds { normal: 1.5, debug: 0.1 };
    assert!(thresholds.validate().is_err());

    let thresholds = ConfidenceThresholds { normal: f32::NAN, debug: 0.1 };
    assert!(thresholds.validate().is_err());
}

#[test]
fn test_default_tuning() {
    let tuning = ClassifierTuning::default();
    assert_eq!(tuning.squat_margin, 0.05);
    assert_eq!(tuning.angle_slope, 2.0);
    assert_eq!(tuning.form_band, 15.0);
    assert_eq!(tuning.pushup_ideal_elbow, 90.0);
    assert_eq!(tuning.plank_ideal_body_line, 180.0);
    assert!(tuning.validate().is_ok());
}

#[test]
fn test_tuning_deserialize_with_defaults() {
    let json = r#"{ "squat_margin": 0.08, "form_band": 10.0 }"#;
    let tuning: ClassifierTuning = serde_json::from_str(json).unwrap();

    assert_eq!(tuning.squat_margin, 0.08);
    assert_eq!(tuning.form_band, 10.0);
    assert_eq!(tuning.angle_slope, 2.0);
}

#[test]
fn test_invalid_tuning() {
    let tuning = ClassifierTuning {
        form_band: -1.0,
        ..ClassifierTuning::default()
    };
    let err = tuning.validate().unwrap_err();
    assert!(err.to_string().contains("form_band"));
}
