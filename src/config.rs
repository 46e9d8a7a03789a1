// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ChatRepository, DepartmentRepository, PontoRepository, RbacRepository,
        SolicitacaoRepository, UserRepository,
    },
    services::{
        auth::AuthService, chat_hub::ChatHub, chat_service::ChatService,
        department_service::DepartmentService, employee_service::EmployeeService,
        ponto_service::PontoService, rbac_service::RbacService,
        solicitacao_service::SolicitacaoService, upload_service::UploadService,
    },
};

/// Credenciais do primeiro administrador, criado quando a base está vazia.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub name: String,
    pub email: String,
    pub password: String,
    pub cpf: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
    /// Fuso usado para agrupar as batidas de ponto por dia.
    pub ponto_offset: FixedOffset,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave/valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} deve ser definida"))
        };

        let offset_hours: i32 = parse_or(&lookup, "PONTO_UTC_OFFSET_HOURS", -3)?;
        let ponto_offset = FixedOffset::east_opt(offset_hours * 3600)
            .ok_or_else(|| anyhow!("PONTO_UTC_OFFSET_HOURS fora do intervalo: {offset_hours}"))?;

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap {
                name: lookup("ADMIN_NAME").unwrap_or_else(|| "Administrador".to_string()),
                email,
                password,
                cpf: lookup("ADMIN_CPF"),
            }),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            session_ttl_hours: parse_or(&lookup, "SESSION_TTL_HOURS", 24 * 7)?,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", false)?,
            upload_dir: lookup("UPLOAD_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("uploads")),
            upload_max_bytes: parse_or(&lookup, "UPLOAD_MAX_BYTES", 5 * 1024 * 1024)?,
            ponto_offset,
            admin,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("valor inválido para {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub rbac_repo: RbacRepository,
    pub employee_service: EmployeeService,
    pub department_service: DepartmentService,
    pub rbac_service: RbacService,
    pub ponto_service: PontoService,
    pub chat_hub: ChatHub,
    pub chat_service: ChatService,
    pub solicitacao_service: SolicitacaoService,
    pub upload_service: UploadService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    /// Monta o grafo de dependências sobre uma pool já criada.
    pub fn with_pool(db_pool: PgPool, config: Config) -> Self {
        let config = Arc::new(config);

        let user_repo = UserRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let department_repo = DepartmentRepository::new(db_pool.clone());
        let ponto_repo = PontoRepository::new(db_pool.clone());
        let chat_repo = ChatRepository::new(db_pool.clone());
        let solicitacao_repo = SolicitacaoRepository::new(db_pool.clone());

        let chat_hub = ChatHub::new();

        let auth_service = AuthService::new(
            user_repo.clone(),
            rbac_repo.clone(),
            config.jwt_secret.clone(),
            config.session_ttl_hours,
        );

        Self {
            auth_service,
            employee_service: EmployeeService::new(user_repo.clone(), rbac_repo.clone(), db_pool.clone()),
            department_service: DepartmentService::new(department_repo),
            rbac_service: RbacService::new(rbac_repo.clone(), db_pool.clone()),
            ponto_service: PontoService::new(ponto_repo, user_repo.clone(), config.ponto_offset),
            chat_service: ChatService::new(chat_repo, user_repo.clone(), chat_hub.clone()),
            solicitacao_service: SolicitacaoService::new(solicitacao_repo),
            upload_service: UploadService::new(config.upload_dir.clone(), config.upload_max_bytes),
            chat_hub,
            rbac_repo,
            db_pool,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/fyzen"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.session_ttl_hours, 168);
        assert_eq!(config.upload_max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.ponto_offset.local_minus_utc(), -3 * 3600);
        assert!(!config.cookie_secure);
        assert!(config.admin.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/fyzen")]));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_invalid_numbers() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/fyzen"),
            ("JWT_SECRET", "segredo"),
            ("UPLOAD_MAX_BYTES", "muito"),
        ]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/fyzen"),
            ("JWT_SECRET", "segredo"),
            ("PONTO_UTC_OFFSET_HOURS", "30"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn reads_admin_bootstrap() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/fyzen"),
            ("JWT_SECRET", "segredo"),
            ("ADMIN_EMAIL", "admin@fyzen.com.br"),
            ("ADMIN_PASSWORD", "trocar123"),
        ]))
        .unwrap();

        let admin = config.admin.unwrap();
        assert_eq!(admin.name, "Administrador");
        assert_eq!(admin.email, "admin@fyzen.com.br");
        assert!(admin.cpf.is_none());
    }
}
