// src/services/employee_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::blank_to_none, error::AppError, validation::{is_valid_cpf, normalize_cpf}},
    config::AdminBootstrap,
    db::{user_repo::NewUser, RbacRepository, UserRepository},
    models::{
        auth::UserStatus,
        employees::{
            CreateEmployeePayload, Employee, EmployeeChanges, EmployeeFilters,
            UpdateEmployeePayload,
        },
    },
    services::auth::hash_password,
};

/// Nome do cargo semeado pela migração com todas as permissões.
pub const ADMIN_ROLE_NAME: &str = "Administrador";

#[derive(Clone)]
pub struct EmployeeService {
    user_repo: UserRepository,
    rbac_repo: RbacRepository,
    pool: PgPool,
}

impl EmployeeService {
    pub fn new(user_repo: UserRepository, rbac_repo: RbacRepository, pool: PgPool) -> Self {
        Self { user_repo, rbac_repo, pool }
    }

    pub async fn list(&self, filters: &EmployeeFilters) -> Result<Vec<Employee>, AppError> {
        let search = blank_to_none(filters.q.as_deref());
        self.user_repo.list_employees(filters, search.as_deref()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Employee, AppError> {
        self.user_repo
            .find_employee(id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn create(&self, payload: &CreateEmployeePayload) -> Result<Employee, AppError> {
        let password_hash = hash_password(&payload.password).await?;
        let email = payload.email.trim().to_lowercase();
        let cpf = normalize_cpf(&payload.cpf);

        let user = self.user_repo
            .create_user(
                &self.pool,
                NewUser {
                    name: payload.name.trim(),
                    email: &email,
                    cpf: &cpf,
                    password_hash: &password_hash,
                    phone: payload.phone.as_deref(),
                    role_id: payload.role_id,
                    avatar_url: payload.avatar_url.as_deref(),
                    hired_at: payload.hired_at,
                },
            )
            .await?;

        tracing::info!("👤 Funcionário {} cadastrado", user.id);
        self.get(user.id).await
    }

    pub async fn update(
        &self,
        actor_id: Uuid,
        id: Uuid,
        payload: UpdateEmployeePayload,
    ) -> Result<Employee, AppError> {
        if id == actor_id && payload.status == Some(UserStatus::Inativo) {
            return Err(AppError::BadRequest("Você não pode desativar o seu próprio usuário.".into()));
        }

        let password_hash = match payload.password.as_deref() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let changes = EmployeeChanges {
            name: payload.name.map(|n| n.trim().to_string()),
            email: payload.email.map(|e| e.trim().to_lowercase()),
            cpf: payload.cpf.as_deref().map(normalize_cpf),
            password_hash,
            phone: payload.phone,
            role_id: payload.role_id,
            status: payload.status,
            avatar_url: payload.avatar_url,
            hired_at: payload.hired_at,
        };

        self.user_repo
            .update_user(id, &changes)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.get(id).await
    }

    /// Exclusão lógica: o funcionário passa para INATIVO e mantém o histórico.
    pub async fn deactivate(&self, actor_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if id == actor_id {
            return Err(AppError::BadRequest("Você não pode desativar o seu próprio usuário.".into()));
        }

        if !self.user_repo.set_status(id, UserStatus::Inativo).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!("🚫 Funcionário {} desativado por {}", id, actor_id);
        Ok(())
    }

    /// Cria o primeiro administrador quando a base ainda não tem usuários.
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.user_repo.count_users(&mut *tx).await? > 0 {
            return Ok(false);
        }

        let role_id = self.rbac_repo
            .find_role_id_by_name(&mut *tx, ADMIN_ROLE_NAME)
            .await?
            .ok_or_else(|| anyhow::anyhow!("cargo '{}' não encontrado", ADMIN_ROLE_NAME))?;

        let password_hash = hash_password(&admin.password).await?;
        // Sem ADMIN_CPF usamos um CPF válido de placeholder
        let cpf = match admin.cpf.as_deref() {
            Some(raw) if is_valid_cpf(raw) => normalize_cpf(raw),
            Some(_) => return Err(anyhow::anyhow!("ADMIN_CPF inválido").into()),
            None => "52998224725".to_string(),
        };
        let email = admin.email.trim().to_lowercase();

        let user = self.user_repo
            .create_user(
                &mut *tx,
                NewUser {
                    name: &admin.name,
                    email: &email,
                    cpf: &cpf,
                    password_hash: &password_hash,
                    phone: None,
                    role_id: Some(role_id),
                    avatar_url: None,
                    hired_at: None,
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🛡️ Administrador inicial criado: {} ({})", email, user.id);
        Ok(true)
    }
}
