use jumpkit::resilience::ErrorPolicy;

#[test]
fn test_default_policy_reports_not_computable() {
    assert_eq!(ErrorPolicy::default(), ErrorPolicy::ReportNotComputable);
}

#[test]
fn test_policy_from_json() {
    let policy: ErrorPolicy = serde_json::from_value(serde_json::json!("Skip")).unwrap();
    assert_eq!(policy, ErrorPolicy::Skip);

    assert!(serde_json::from_value::<ErrorPolicy>(serde_json::json!("Retry")).is_err());
}
