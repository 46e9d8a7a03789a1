// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_session,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::change_password,

        // --- Employees ---
        handlers::employees::list_employees,
        handlers::employees::get_employee,
        handlers::employees::create_employee,
        handlers::employees::update_employee,
        handlers::employees::delete_employee,

        // --- Departments ---
        handlers::departments::list_departments,
        handlers::departments::get_department,
        handlers::departments::create_department,
        handlers::departments::update_department,
        handlers::departments::delete_department,

        // --- RBAC ---
        handlers::rbac::list_roles,
        handlers::rbac::get_role,
        handlers::rbac::create_role,
        handlers::rbac::update_role,
        handlers::rbac::delete_role,
        handlers::rbac::get_role_permissions,
        handlers::rbac::set_role_permissions,
        handlers::rbac::list_permissions,

        // --- Ponto ---
        handlers::ponto::registrar_ponto,
        handlers::ponto::listar_ponto,
        handlers::ponto::lancar_ponto,
        handlers::ponto::ajustar_ponto,
        handlers::ponto::excluir_ponto,

        // --- Solicitações ---
        handlers::solicitacoes::create_solicitacao,
        handlers::solicitacoes::list_minhas,
        handlers::solicitacoes::list_solicitacoes,
        handlers::solicitacoes::get_solicitacao,
        handlers::solicitacoes::decidir_solicitacao,
        handlers::solicitacoes::cancelar_solicitacao,

        // --- Chat ---
        handlers::chat::send_message,
        handlers::chat::delete_message,
        handlers::chat::list_conversations,
        handlers::chat::list_messages,
        handlers::chat::mark_read,
        handlers::chat::unread,
        handlers::chat::list_contacts,
        handlers::chat::presence,
        handlers::chat::chat_ws,

        // --- Uploads ---
        handlers::uploads::upload_file,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserStatus,
            models::auth::LoginUserPayload,
            models::auth::ChangePasswordPayload,
            models::auth::AuthResponse,
            models::auth::SessionResponse,

            // --- Employees ---
            models::employees::Employee,
            models::employees::CreateEmployeePayload,
            models::employees::UpdateEmployeePayload,

            // --- Departments ---
            models::departments::Department,
            handlers::departments::CreateDepartmentPayload,
            handlers::departments::UpdateDepartmentPayload,

            // --- RBAC ---
            models::rbac::Role,
            models::rbac::Permission,
            models::rbac::CreateRolePayload,
            models::rbac::UpdateRolePayload,
            models::rbac::SetRolePermissionsPayload,
            models::rbac::RoleResponse,

            // --- Ponto ---
            models::ponto::TipoPonto,
            models::ponto::PontoRegistro,
            models::ponto::Turno,
            models::ponto::ResumoDia,
            models::ponto::ResumoPonto,
            models::ponto::PontoListResponse,
            models::ponto::RegistrarPontoPayload,
            models::ponto::LancarPontoPayload,
            models::ponto::AjustarPontoPayload,

            // --- Solicitações ---
            models::solicitacoes::TipoSolicitacao,
            models::solicitacoes::StatusSolicitacao,
            models::solicitacoes::Solicitacao,
            models::solicitacoes::CreateSolicitacaoPayload,
            models::solicitacoes::DecisaoPayload,

            // --- Chat ---
            models::chat::ChatMessage,
            models::chat::Conversation,
            models::chat::ChatContact,
            models::chat::UnreadCount,
            models::chat::UnreadSummary,
            models::chat::PresenceSnapshot,
            models::chat::ReadReceipt,
            models::chat::SendMessagePayload,
            models::chat::SentMessage,

            // --- Uploads ---
            models::uploads::UploadResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout e sessão"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Employees", description = "Cadastro de Funcionários"),
        (name = "Departments", description = "Departamentos"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)"),
        (name = "Ponto", description = "Registro de Ponto e Apuração de Horas"),
        (name = "Solicitacoes", description = "Férias, Folgas, Atestados e Ajustes"),
        (name = "Chat", description = "Mensagens Internas e Presença"),
        (name = "Uploads", description = "Envio de Arquivos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("fyzen_session"))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_module() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/auth/login",
            "/api/employees/{id}",
            "/api/roles/{id}/permissions",
            "/api/ponto",
            "/api/solicitacoes/{id}/decisao",
            "/api/chat/messages",
            "/api/uploads",
        ] {
            assert!(paths.contains_key(path), "faltando {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
