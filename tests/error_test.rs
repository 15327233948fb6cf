//! Tests for error types

use lr_tracking::Error;

#[test]
fn test_api_error() {
    let error = Error::Api {
        status: 404,
        error_code: "RESOURCE_DOES_NOT_EXIST".to_string(),
        message: "Could not find experiment".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("404"));
    assert!(error_str.contains("RESOURCE_DOES_NOT_EXIST"));
    assert!(error_str.contains("Could not find experiment"));
    assert_eq!(error.api_error_code(), Some("RESOURCE_DOES_NOT_EXIST"));
}

#[test]
fn test_deleted_experiment_error() {
    let error = Error::DeletedExperiment("Guildford Models".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("deleted experiment 'Guildford Models'"));
    assert!(error_str.contains("EXPERIMENT_NAME"));
}

#[test]
fn test_no_active_experiment_error() {
    let error_str = format!("{}", Error::NoActiveExperiment);
    assert!(error_str.contains("set_experiment"));
}

#[test]
fn test_run_sealed_error() {
    let error = Error::RunSealed("abc".to_string());
    assert!(format!("{error}").contains("Run abc is finalized"));
    assert_eq!(error.api_error_code(), None);
}

#[test]
fn test_unsupported_artifact_uri_error() {
    let error = Error::UnsupportedArtifactUri("s3://bucket".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("s3://bucket"));
    assert!(error_str.contains("mlflow-artifacts:/"));
}

#[test]
fn test_fit_and_shape_errors() {
    assert!(format!("{}", Error::Fit("singular".to_string())).contains("Model fitting failed"));
    let shape = Error::ShapeMismatch("3 vs 2".to_string());
    assert!(format!("{shape}").contains("Shape mismatch: 3 vs 2"));
    assert!(format!("{}", Error::NotFitted("predict")).contains("call fit before predict"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").starts_with("JSON error"));
}

#[test]
fn test_error_debug() {
    let error = Error::NoActiveExperiment;
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("NoActiveExperiment"));
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> lr_tracking::Result<i32> {
        Err(Error::RunNotFound("r".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
