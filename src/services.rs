pub mod auth;
pub mod chat_hub;
pub mod chat_service;
pub mod department_service;
pub mod employee_service;
pub mod ponto_service;
pub mod rbac_service;
pub mod solicitacao_service;
pub mod upload_service;
