// src/middleware/rbac.rs

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::marker::PhantomData;

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

/// Uma permissão do sistema, identificada pelo slug gravado em `permissions`.
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// Guardião: o handler só roda se o usuário da sessão tiver a permissão `T`.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        let required_perm = T::slug();

        if !app_state.rbac_repo.user_has_permission(user.0.id, required_perm).await? {
            tracing::debug!("Acesso negado a {}: falta '{}'", user.0.id, required_perm);
            return Err(AppError::Forbidden(format!(
                "Você precisa da permissão '{}' para realizar esta ação.",
                required_perm
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

/// Checagem pontual, para handlers que mudam de comportamento conforme a permissão.
pub async fn has_permission<T: PermissionDef>(app_state: &AppState, user_id: uuid::Uuid) -> Result<bool, AppError> {
    app_state.rbac_repo.user_has_permission(user_id, T::slug()).await
}

macro_rules! permission {
    ($name:ident, $slug:literal) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn slug() -> &'static str { $slug }
        }
    };
}

permission!(PermEmployeesRead, "employees:read");
permission!(PermEmployeesWrite, "employees:write");
permission!(PermDepartmentsWrite, "departments:write");
permission!(PermRolesWrite, "roles:write");
permission!(PermPermissionsManage, "permissions:manage");
permission!(PermPontoReadAll, "ponto:read_all");
permission!(PermPontoManage, "ponto:manage");
permission!(PermSolicitacoesReview, "solicitacoes:review");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_follow_module_action_pattern() {
        let slugs = [
            PermEmployeesRead::slug(),
            PermEmployeesWrite::slug(),
            PermDepartmentsWrite::slug(),
            PermRolesWrite::slug(),
            PermPermissionsManage::slug(),
            PermPontoReadAll::slug(),
            PermPontoManage::slug(),
            PermSolicitacoesReview::slug(),
        ];
        for slug in slugs {
            let (module, action) = slug.split_once(':').unwrap();
            assert!(!module.is_empty() && !action.is_empty(), "{slug}");
        }
    }
}
