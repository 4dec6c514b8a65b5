use hub_service::error::AppError;
use hub_service::middleware::error_handling::map_error;

#[test]
fn maps_config_error_to_500() {
    let (status, body) = map_error(&AppError::Config("missing".into()));
    assert_eq!(status.as_u16(), 500);
    assert!(body.message.contains("config"));
}

#[test]
fn maps_authz_errors() {
    let (status, body) = map_error(&AppError::Forbidden);
    assert_eq!(status.as_u16(), 403);
    assert_eq!(body.error_type, "authorization_error");

    let (status, body) = map_error(&AppError::Unauthorized);
    assert_eq!(status.as_u16(), 401);
    assert_eq!(body.error_type, "authentication_error");
}

#[test]
fn maps_conflict_with_detail() {
    let (status, body) = map_error(&AppError::Conflict("invite code already in use".into()));
    assert_eq!(status.as_u16(), 409);
    assert!(body.message.contains("invite code"));
}

#[test]
fn not_found_is_404() {
    let (status, _) = map_error(&AppError::NotFound);
    assert_eq!(status.as_u16(), 404);
}
