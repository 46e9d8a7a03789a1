// src/services/department_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DepartmentRepository,
    models::departments::Department,
};

#[derive(Clone)]
pub struct DepartmentService {
    repo: DepartmentRepository,
}

impl DepartmentService {
    pub fn new(repo: DepartmentRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Department>, AppError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Department, AppError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Departamento não encontrado.".into()))
    }

    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<Department, AppError> {
        let department = self.repo.create(name.trim(), description).await?;
        tracing::info!("🏢 Departamento '{}' criado", department.name);
        Ok(department)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Department, AppError> {
        if !self.repo.update(id, name.map(str::trim), description).await? {
            return Err(AppError::NotFound("Departamento não encontrado.".into()));
        }
        self.get(id).await
    }

    /// Só remove departamentos sem cargos vinculados.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let department = self.get(id).await?;
        ensure_deletable(&department)?;

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Departamento não encontrado.".into()));
        }
        Ok(())
    }
}

fn ensure_deletable(department: &Department) -> Result<(), AppError> {
    if department.role_count > 0 {
        return Err(AppError::Conflict(format!(
            "Existem {} cargo(s) vinculados a este departamento.",
            department.role_count
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn department(role_count: i64, employee_count: i64) -> Department {
        Department {
            id: Uuid::new_v4(),
            name: "Financeiro".into(),
            description: None,
            role_count,
            employee_count,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn department_with_roles_cannot_be_deleted() {
        let err = ensure_deletable(&department(2, 5)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains('2')));
    }

    #[test]
    fn empty_department_can_be_deleted() {
        assert!(ensure_deletable(&department(0, 0)).is_ok());
    }
}
