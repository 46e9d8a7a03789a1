pub mod auth;
pub mod chat;
pub mod departments;
pub mod employees;
pub mod ponto;
pub mod rbac;
pub mod solicitacoes;
pub mod uploads;
