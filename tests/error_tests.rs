use axum::http::StatusCode;
use axum::response::IntoResponse;
use inspection_live::error::{validation, AppError, AppResult, OptionExt};

#[test]
fn test_app_error_display() {
    let error = AppError::BadRequest("Invalid input".to_string());
    assert_eq!(format!("{}", error), "Bad request: Invalid input");

    let error = AppError::NotFound("Resource not found".to_string());
    assert_eq!(format!("{}", error), "Not found: Resource not found");

    let error = AppError::ValidationError { field: "camera_id".into(), message: "empty".into() };
    assert_eq!(format!("{}", error), "Validation error on field 'camera_id': empty");
}

#[test]
fn test_app_error_into_response() {
    assert_eq!(AppError::BadRequest("x".into()).into_response().status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::NotFound("x".into()).into_response().status(), StatusCode::NOT_FOUND);
    assert_eq!(
        AppError::ServiceUnavailable("x".into()).into_response().status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        AppError::Database("x".into()).into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_error_envelope() {
    let response = AppError::NotFound("live camera not found".into()).into_response();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(v["error"]["code"], "NOT_FOUND");
    assert_eq!(v["error"]["message"], "live camera not found");
    assert_eq!(v["status"], 404);
    assert!(v["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_database_error_hides_driver_message() {
    let response = AppError::Database("no such table: planning".into()).into_response();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(v["error"]["code"], "DATABASE_ERROR");
    assert!(v["error"]["details"]["error_id"].as_str().is_some());
    assert!(!v.to_string().contains("planning"));
}

#[test]
fn test_from_sqlx_error() {
    assert!(matches!(AppError::from(sqlx::Error::RowNotFound), AppError::NotFound(_)));
    assert!(matches!(AppError::from(sqlx::Error::PoolTimedOut), AppError::ServiceUnavailable(_)));
    assert!(matches!(AppError::from(sqlx::Error::PoolClosed), AppError::Database(_)));
}

#[test]
fn test_option_ext() {
    let result: AppResult<i32> = Some(42).ok_or_not_found("test entity");
    assert_eq!(result.unwrap(), 42);

    let result: AppResult<i32> = None::<i32>.ok_or_not_found("test entity");
    match result.unwrap_err() {
        AppError::NotFound(msg) => assert_eq!(msg, "test entity not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_validate_camera_id() {
    assert_eq!(validation::validate_camera_id("  CAM1 ").unwrap(), "CAM1");

    match validation::validate_camera_id("   ").unwrap_err() {
        AppError::ValidationError { field, message } => {
            assert_eq!(field, "camera_id");
            assert_eq!(message, "Camera id cannot be empty");
        }
        _ => panic!("Expected ValidationError"),
    }

    assert!(validation::validate_camera_id("CAM\u{0}1").is_err());
    let too_long = "C".repeat(validation::MAX_CAMERA_ID_LEN + 1);
    assert!(validation::validate_camera_id(&too_long).is_err());
    let longest = "C".repeat(validation::MAX_CAMERA_ID_LEN);
    assert!(validation::validate_camera_id(&longest).is_ok());
}
