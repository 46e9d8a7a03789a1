// src/services/rbac_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RbacRepository,
    models::rbac::{Permission, Role, RoleResponse},
    services::employee_service::ADMIN_ROLE_NAME,
};

fn role_not_found() -> AppError {
    AppError::NotFound("Cargo não encontrado.".into())
}

#[derive(Clone)]
pub struct RbacService {
    repo: RbacRepository,
    pool: PgPool,
}

impl RbacService {
    pub fn new(repo: RbacRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleResponse>, AppError> {
        let roles = self.repo.list_roles().await?;
        let pairs = self.repo.all_role_permission_slugs().await?;
        Ok(attach_permissions(roles, pairs))
    }

    pub async fn get_role(&self, role_id: Uuid) -> Result<RoleResponse, AppError> {
        let role = self.repo
            .find_role(&self.pool, role_id)
            .await?
            .ok_or_else(role_not_found)?;
        let permissions = self.repo.role_permission_slugs(&self.pool, role_id).await?;

        Ok(RoleResponse { role, permissions })
    }

    pub async fn create_role_with_permissions(
        &self,
        name: &str,
        description: Option<&str>,
        department_id: Option<Uuid>,
        permission_slugs: &[String],
    ) -> Result<RoleResponse, AppError> {
        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o Cargo
        let role = self.repo
            .create_role(&mut *tx, name.trim(), description, department_id)
            .await?;

        // 3. Resolve Slugs ("employees:read") para IDs; slugs desconhecidos ficam de fora
        let permissions = self.repo.find_permissions_by_slugs(&mut *tx, permission_slugs).await?;

        let permission_ids: Vec<Uuid> = permissions.iter().map(|p| p.id).collect();
        let mut valid_slugs: Vec<String> = permissions.into_iter().map(|p| p.slug).collect();
        valid_slugs.sort();

        // 4. Salva o Vínculo
        if !permission_ids.is_empty() {
            self.repo.assign_permissions(&mut *tx, role.id, &permission_ids).await?;
        }

        // 5. Commit
        tx.commit().await?;

        tracing::info!("🧩 Cargo '{}' criado com {} permissão(ões)", role.name, valid_slugs.len());
        Ok(RoleResponse { role, permissions: valid_slugs })
    }

    pub async fn update_role(
        &self,
        role_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        department_id: Option<Uuid>,
    ) -> Result<Role, AppError> {
        let name = name.map(str::trim);
        if let Some(new_name) = name {
            let role = self.repo
                .find_role(&self.pool, role_id)
                .await?
                .ok_or_else(role_not_found)?;
            if is_admin_role(&role) && new_name != role.name {
                return Err(AppError::Conflict("O cargo Administrador não pode ser renomeado.".into()));
            }
        }

        self.repo
            .update_role(role_id, name, description, department_id)
            .await?
            .ok_or_else(role_not_found)
    }

    /// Só remove cargos sem funcionários (ativos ou não).
    pub async fn delete_role(&self, role_id: Uuid) -> Result<(), AppError> {
        let role = self.repo
            .find_role(&self.pool, role_id)
            .await?
            .ok_or_else(role_not_found)?;
        ensure_deletable(&role)?;

        if !self.repo.delete_role(role_id).await? {
            return Err(role_not_found());
        }
        Ok(())
    }

    /// Substitui todo o conjunto de permissões do cargo, atomicamente.
    pub async fn set_role_permissions(
        &self,
        role_id: Uuid,
        permission_slugs: &[String],
    ) -> Result<RoleResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let role = self.repo
            .find_role(&mut *tx, role_id)
            .await?
            .ok_or_else(role_not_found)?;
        if is_admin_role(&role) {
            return Err(AppError::Conflict(
                "As permissões do cargo Administrador não podem ser alteradas.".into(),
            ));
        }

        let permissions = self.repo.find_permissions_by_slugs(&mut *tx, permission_slugs).await?;
        let unknown = unknown_slugs(permission_slugs, &permissions);
        if !unknown.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Permissões desconhecidas: {}",
                unknown.join(", ")
            )));
        }

        let permission_ids: Vec<Uuid> = permissions.iter().map(|p| p.id).collect();
        self.repo.clear_permissions(&mut *tx, role_id).await?;
        if !permission_ids.is_empty() {
            self.repo.assign_permissions(&mut *tx, role_id, &permission_ids).await?;
        }

        let slugs = self.repo.role_permission_slugs(&mut *tx, role_id).await?;
        tx.commit().await?;

        tracing::info!("🔐 Permissões do cargo '{}' atualizadas: {:?}", role.name, slugs);
        Ok(RoleResponse { role, permissions: slugs })
    }

    pub async fn list_system_permissions(&self) -> Result<Vec<Permission>, AppError> {
        self.repo.list_all_permissions(&self.pool).await
    }
}

/// Distribui os pares (cargo, slug) entre os cargos, mantendo a ordem de cada lista.
fn attach_permissions(roles: Vec<Role>, pairs: Vec<(Uuid, String)>) -> Vec<RoleResponse> {
    let mut slugs_by_role: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (role_id, slug) in pairs {
        slugs_by_role.entry(role_id).or_default().push(slug);
    }

    roles
        .into_iter()
        .map(|role| {
            let permissions = slugs_by_role.remove(&role.id).unwrap_or_default();
            RoleResponse { role, permissions }
        })
        .collect()
}

/// O cargo semeado mantém todas as permissões e é usado no bootstrap.
fn is_admin_role(role: &Role) -> bool {
    role.name == ADMIN_ROLE_NAME
}

fn ensure_deletable(role: &Role) -> Result<(), AppError> {
    if is_admin_role(role) {
        return Err(AppError::Conflict("O cargo Administrador não pode ser excluído.".into()));
    }
    if role.user_count > 0 {
        return Err(AppError::Conflict(format!(
            "Existem {} funcionário(s) vinculados a este cargo.",
            role.user_count
        )));
    }
    Ok(())
}

/// Slugs pedidos que não existem no catálogo, sem repetição.
fn unknown_slugs(requested: &[String], found: &[Permission]) -> Vec<String> {
    let mut unknown: Vec<String> = requested
        .iter()
        .filter(|slug| !found.iter().any(|p| &p.slug == *slug))
        .cloned()
        .collect();
    unknown.sort();
    unknown.dedup();
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn role(name: &str, user_count: i64) -> Role {
        Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            department_id: None,
            department_name: None,
            user_count,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn permission(slug: &str) -> Permission {
        Permission {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            description: String::new(),
            module: "TESTE".to_string(),
        }
    }

    #[test]
    fn reports_each_unknown_slug_once() {
        let requested = vec![
            "employees:read".to_string(),
            "voar:alto".to_string(),
            "voar:alto".to_string(),
            "admin:tudo".to_string(),
        ];
        let found = vec![permission("employees:read")];

        assert_eq!(unknown_slugs(&requested, &found), vec!["admin:tudo", "voar:alto"]);
    }

    #[test]
    fn nothing_unknown_when_all_exist() {
        let requested = vec!["ponto:manage".to_string()];
        assert!(unknown_slugs(&requested, &[permission("ponto:manage")]).is_empty());
    }

    #[test]
    fn role_with_users_cannot_be_deleted() {
        let err = ensure_deletable(&role("Analista de RH", 3)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains('3')));
        assert!(ensure_deletable(&role("Analista de RH", 0)).is_ok());
    }

    #[test]
    fn admin_role_is_protected() {
        let admin = role(ADMIN_ROLE_NAME, 0);
        assert!(is_admin_role(&admin));
        assert!(matches!(ensure_deletable(&admin), Err(AppError::Conflict(_))));
        assert!(!is_admin_role(&role("administrador de redes", 0)));
    }

    #[test]
    fn permissions_are_grouped_per_role() {
        let rh = role("Analista de RH", 1);
        let ti = role("Suporte", 0);
        let pairs = vec![
            (rh.id, "employees:read".to_string()),
            (ti.id, "ponto:manage".to_string()),
            (rh.id, "ponto:read_all".to_string()),
        ];

        let response = attach_permissions(vec![rh, ti, role("Estagiário", 0)], pairs);

        assert_eq!(response[0].permissions, vec!["employees:read", "ponto:read_all"]);
        assert_eq!(response[1].permissions, vec!["ponto:manage"]);
        assert!(response[2].permissions.is_empty());
    }
}
