//! Form validation endpoints for the sign-in and sign-up screens. A valid form
//! only means the fields are well formed.

use axum::response::{IntoResponse, Json};
use tracing::debug;
use validator::Validate;

use crate::{
    dto::auth_dto::{FormValidationResponse, LoginForm, RegisterForm},
    error::Result,
};

#[utoipa::path(
    post,
    path = "/api/auth/validate/login",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Form is well formed", body = Json<FormValidationResponse>),
        (status = 422, description = "Field errors keyed by field name")
    )
)]
#[axum::debug_handler]
pub async fn validate_login(Json(form): Json<LoginForm>) -> Result<impl IntoResponse> {
    form.validate()?;
    debug!("login form passed validation");
    Ok(Json(FormValidationResponse { valid: true }))
}

#[utoipa::path(
    post,
    path = "/api/auth/validate/register",
    request_body = RegisterForm,
    responses(
        (status = 200, description = "Form is well formed", body = Json<FormValidationResponse>),
        (status = 422, description = "Field errors keyed by field name")
    )
)]
#[axum::debug_handler]
pub async fn validate_register(Json(form): Json<RegisterForm>) -> Result<impl IntoResponse> {
    form.validate()?;
    debug!("registration form passed validation");
    Ok(Json(FormValidationResponse { valid: true }))
}
