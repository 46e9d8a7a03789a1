// src/db/rbac_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::rbac::{Permission, Role},
};

const ROLE_SELECT: &str = r#"
    SELECT r.id, r.name, r.description, r.department_id, d.name AS department_name,
           (SELECT COUNT(*) FROM users u WHERE u.role_id = r.id) AS user_count,
           r.created_at, r.updated_at
    FROM roles r
    LEFT JOIN departments d ON d.id = r.department_id
"#;

fn role_conflict(constraint: &str) -> Option<AppError> {
    match constraint {
        "roles_name_key" => Some(AppError::Conflict("Já existe um cargo com esse nome.".into())),
        "roles_department_id_fkey" => Some(AppError::BadRequest("O departamento informado não existe.".into())),
        "users_role_id_fkey" => Some(AppError::Conflict("Existem funcionários vinculados a este cargo.".into())),
        _ => None,
    }
}

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CARGOS
    // =========================================================================

    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let sql = format!("{ROLE_SELECT} ORDER BY r.name");
        let roles = sqlx::query_as::<_, Role>(&sql).fetch_all(&self.pool).await?;
        Ok(roles)
    }

    pub async fn find_role<'e, E>(&self, executor: E, role_id: Uuid) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{ROLE_SELECT} WHERE r.id = $1");
        let role = sqlx::query_as::<_, Role>(&sql)
            .bind(role_id)
            .fetch_optional(executor)
            .await?;
        Ok(role)
    }

    pub async fn find_role_id_by_name<'e, E>(&self, executor: E, name: &str) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(executor)
            .await?;
        Ok(id)
    }

    // 1. Criar o Cargo
    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        department_id: Option<Uuid>,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(
            r#"
            WITH novo AS (
                INSERT INTO roles (name, description, department_id)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT n.id, n.name, n.description, n.department_id, d.name AS department_name,
                   0::bigint AS user_count, n.created_at, n.updated_at
            FROM novo n
            LEFT JOIN departments d ON d.id = n.department_id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(department_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, role_conflict))
    }

    pub async fn update_role(
        &self,
        role_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        department_id: Option<Uuid>,
    ) -> Result<Option<Role>, AppError> {
        sqlx::query_as::<_, Role>(
            r#"
            WITH alterado AS (
                UPDATE roles SET
                    name          = COALESCE($2, name),
                    description   = COALESCE($3, description),
                    department_id = COALESCE($4, department_id),
                    updated_at    = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT a.id, a.name, a.description, a.department_id, d.name AS department_name,
                   (SELECT COUNT(*) FROM users u WHERE u.role_id = a.id) AS user_count,
                   a.created_at, a.updated_at
            FROM alterado a
            LEFT JOIN departments d ON d.id = a.department_id
            "#,
        )
        .bind(role_id)
        .bind(name)
        .bind(description)
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, role_conflict))
    }

    pub async fn delete_role(&self, role_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, role_conflict))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  PERMISSÕES
    // =========================================================================

    // 2. Buscar as permissões baseado nos Slugs ("employees:write" -> UUID)
    pub async fn find_permissions_by_slugs<'e, E>(
        &self,
        executor: E,
        slugs: &[String],
    ) -> Result<Vec<Permission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O SQLx lida bem com arrays usando ANY
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, slug, description, module FROM permissions WHERE slug = ANY($1)",
        )
        .bind(slugs)
        .fetch_all(executor)
        .await?;

        Ok(permissions)
    }

    // 3. Vincular Cargo <-> Permissão
    pub async fn assign_permissions<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Inserção em massa usando UNNEST
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn clear_permissions<'e, E>(&self, executor: E, role_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // 4. Listar todas as permissões disponíveis (para o Frontend montar a matriz)
    pub async fn list_all_permissions<'e, E>(&self, executor: E) -> Result<Vec<Permission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, slug, description, module FROM permissions ORDER BY module, slug",
        )
        .fetch_all(executor)
        .await?;

        Ok(permissions)
    }

    pub async fn role_permission_slugs<'e, E>(&self, executor: E, role_id: Uuid) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.slug
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = $1
            ORDER BY p.slug
            "#,
        )
        .bind(role_id)
        .fetch_all(executor)
        .await?;

        Ok(slugs)
    }

    /// Pares (cargo, slug) de todos os cargos, ordenados por slug.
    pub async fn all_role_permission_slugs(&self) -> Result<Vec<(Uuid, String)>, AppError> {
        let pairs = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT rp.role_id, p.slug
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            ORDER BY p.slug
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(pairs)
    }

    /// Permissões efetivas do usuário (as do seu cargo).
    pub async fn user_permissions(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.slug
            FROM users u
            JOIN role_permissions rp ON rp.role_id = u.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE u.id = $1 AND u.status = 'ATIVO'
            ORDER BY p.slug
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    pub async fn user_has_permission(&self, user_id: Uuid, permission_slug: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM users u
                JOIN role_permissions rp ON rp.role_id = u.role_id
                JOIN permissions p ON p.id = rp.permission_id
                WHERE u.id = $1
                  AND u.status = 'ATIVO'
                  AND p.slug = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(permission_slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_role_constraints() {
        assert!(matches!(role_conflict("roles_name_key"), Some(AppError::Conflict(_))));
        assert!(matches!(role_conflict("roles_department_id_fkey"), Some(AppError::BadRequest(_))));
        assert!(matches!(role_conflict("users_role_id_fkey"), Some(AppError::Conflict(_))));
        assert!(role_conflict("outra_constraint").is_none());
    }
}
