// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::CookieJar;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{removal_cookie, session_cookie, AuthenticatedUser},
    models::{
        auth::{AuthResponse, ChangePasswordPayload, LoginUserPayload, SessionResponse},
        employees::Employee,
    },
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado; o cookie de sessão é definido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Usuário inativo")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, user) = app_state.auth_service
        .login_user(&payload.email, &payload.password)
        .await?;
    let session = app_state.auth_service.session(user.id).await?;

    let jar = jar.add(session_cookie(token.clone(), app_state.config.cookie_secure));

    Ok((
        jar,
        Json(AuthResponse {
            token,
            user: session.user,
            permissions: session.permissions,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Cookie de sessão removido")
    )
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.add(removal_cookie()), StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário da sessão e permissões efetivas", body = SessionResponse),
        (status = 401, description = "Sem sessão válida")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_session(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<SessionResponse>, AppError> {
    let session = app_state.auth_service.session(user.id).await?;
    Ok(Json(session))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Dados do usuário logado", body = Employee),
        (status = 401, description = "Sem sessão válida")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Employee>, AppError> {
    let employee = app_state.employee_service.get(user.id).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    put,
    path = "/api/users/me/password",
    tag = "Users",
    request_body = ChangePasswordPayload,
    responses(
        (status = 204, description = "Senha alterada"),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Senha atual incorreta")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.auth_service
        .change_password(&user, &payload.current_password, &payload.new_password)
        .await?;

    tracing::info!("🔒 Senha alterada por {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}
