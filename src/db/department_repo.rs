// src/db/department_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::departments::Department,
};

const DEPARTMENT_SELECT: &str = r#"
    SELECT d.id, d.name, d.description,
           (SELECT COUNT(*) FROM roles r WHERE r.department_id = d.id) AS role_count,
           (SELECT COUNT(*) FROM users u JOIN roles r ON r.id = u.role_id
             WHERE r.department_id = d.id AND u.status = 'ATIVO') AS employee_count,
           d.created_at, d.updated_at
    FROM departments d
"#;

fn department_conflict(constraint: &str) -> Option<AppError> {
    match constraint {
        "departments_name_key" => Some(AppError::Conflict("Já existe um departamento com esse nome.".into())),
        "roles_department_id_fkey" => Some(AppError::Conflict("Existem cargos vinculados a este departamento.".into())),
        _ => None,
    }
}

#[derive(Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Department>, AppError> {
        let sql = format!("{DEPARTMENT_SELECT} ORDER BY d.name");
        let departments = sqlx::query_as::<_, Department>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(departments)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Department>, AppError> {
        let sql = format!("{DEPARTMENT_SELECT} WHERE d.id = $1");
        let department = sqlx::query_as::<_, Department>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(department)
    }

    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, 0::bigint AS role_count, 0::bigint AS employee_count,
                      created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, department_conflict))
    }

    pub async fn update(&self, id: Uuid, name: Option<&str>, description: Option<&str>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE departments SET
                name        = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at  = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, department_conflict))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        // A FK (RESTRICT) também barra a exclusão se houver cargos vinculados
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, department_conflict))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_department_constraints() {
        assert!(matches!(department_conflict("departments_name_key"), Some(AppError::Conflict(_))));
        assert!(matches!(department_conflict("roles_department_id_fkey"), Some(AppError::Conflict(_))));
        assert!(department_conflict("users_email_key").is_none());
    }
}
