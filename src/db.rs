pub mod user_repo;
pub use user_repo::UserRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod department_repo;
pub use department_repo::DepartmentRepository;
pub mod ponto_repo;
pub use ponto_repo::PontoRepository;
pub mod chat_repo;
pub use chat_repo::ChatRepository;
pub mod solicitacao_repo;
pub use solicitacao_repo::SolicitacaoRepository;
