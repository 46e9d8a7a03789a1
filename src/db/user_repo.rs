// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError, validation::cpf_search_digits},
    models::{
        auth::{User, UserStatus},
        chat::ChatContact,
        employees::{Employee, EmployeeChanges, EmployeeFilters},
    },
};

const EMPLOYEE_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, u.cpf, u.phone, u.status, u.avatar_url, u.hired_at,
           u.role_id, r.name AS role_name, r.department_id, d.name AS department_name,
           u.created_at, u.updated_at
    FROM users u
    LEFT JOIN roles r ON r.id = u.role_id
    LEFT JOIN departments d ON d.id = r.department_id
"#;

/// Traduz as constraints da tabela `users` em erros de negócio.
fn user_conflict(constraint: &str) -> Option<AppError> {
    match constraint {
        "users_email_key" => Some(AppError::EmailAlreadyExists),
        "users_cpf_key" => Some(AppError::CpfAlreadyExists),
        "users_role_id_fkey" => Some(AppError::BadRequest("O cargo informado não existe.".into())),
        _ => None,
    }
}

/// Dados de um novo usuário, com senha já transformada em hash.
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub cpf: &'a str,
    pub password_hash: &'a str,
    pub phone: Option<&'a str>,
    pub role_id: Option<Uuid>,
    pub avatar_url: Option<&'a str>,
    pub hired_at: Option<chrono::NaiveDate>,
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let sql = format!("{EMPLOYEE_SELECT} WHERE u.id = $1");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    pub async fn list_employees(&self, filters: &EmployeeFilters, search: Option<&str>) -> Result<Vec<Employee>, AppError> {
        let sql = format!(
            r#"{EMPLOYEE_SELECT}
            WHERE ($1::user_status IS NULL OR u.status = $1)
              AND ($2::uuid IS NULL OR r.department_id = $2)
              AND ($3::uuid IS NULL OR u.role_id = $3)
              AND ($4::text IS NULL
                   OR u.name ILIKE '%' || $4 || '%'
                   OR u.email ILIKE '%' || $4 || '%'
                   OR ($5::text IS NOT NULL AND u.cpf LIKE '%' || $5 || '%'))
            ORDER BY u.name
            "#
        );

        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(filters.status)
            .bind(filters.department_id)
            .bind(filters.role_id)
            .bind(search)
            .bind(search.and_then(cpf_search_digits))
            .fetch_all(&self.pool)
            .await?;

        Ok(employees)
    }

    // Cria um novo usuário no banco de dados
    pub async fn create_user<'e, E>(&self, executor: E, new_user: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, cpf, password_hash, phone, role_id, avatar_url, hired_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new_user.name)
        .bind(new_user.email)
        .bind(new_user.cpf)
        .bind(new_user.password_hash)
        .bind(new_user.phone)
        .bind(new_user.role_id)
        .bind(new_user.avatar_url)
        .bind(new_user.hired_at)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, user_conflict))
    }

    /// Atualização parcial. Retorna `None` se o usuário não existir.
    pub async fn update_user(&self, id: Uuid, changes: &EmployeeChanges) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name          = COALESCE($2, name),
                email         = COALESCE($3, email),
                cpf           = COALESCE($4, cpf),
                password_hash = COALESCE($5, password_hash),
                phone         = COALESCE($6, phone),
                role_id       = COALESCE($7, role_id),
                status        = COALESCE($8, status),
                avatar_url    = COALESCE($9, avatar_url),
                hired_at      = COALESCE($10, hired_at),
                updated_at    = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.cpf.as_deref())
        .bind(changes.password_hash.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.role_id)
        .bind(changes.status)
        .bind(changes.avatar_url.as_deref())
        .bind(changes.hired_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, user_conflict))
    }

    pub async fn set_status(&self, id: Uuid, status: UserStatus) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count_users<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    /// Funcionários ativos com quem se pode conversar (todos menos o próprio).
    pub async fn list_contacts(&self, user_id: Uuid) -> Result<Vec<ChatContact>, AppError> {
        let contacts = sqlx::query_as::<_, ChatContact>(
            r#"
            SELECT u.id, u.name, u.avatar_url, r.name AS role_name
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            WHERE u.status = 'ATIVO' AND u.id <> $1
            ORDER BY u.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_email_and_cpf_become_specific_errors() {
        assert!(matches!(user_conflict("users_email_key"), Some(AppError::EmailAlreadyExists)));
        assert!(matches!(user_conflict("users_cpf_key"), Some(AppError::CpfAlreadyExists)));
        assert!(matches!(user_conflict("users_role_id_fkey"), Some(AppError::BadRequest(_))));
        assert!(user_conflict("roles_name_key").is_none());
    }
}
