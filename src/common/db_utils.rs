// src/common/db_utils.rs

use crate::common::error::AppError;

/// Converte violações de UNIQUE/FOREIGN KEY em erros de conflito amigáveis.
/// `by_constraint` recebe o nome da constraint violada e pode devolver um erro específico.
pub(crate) fn map_constraint_error<F>(e: sqlx::Error, by_constraint: F) -> AppError
where
    F: Fn(&str) -> Option<AppError>,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
            if let Some(err) = by_constraint(db_err.constraint().unwrap_or_default()) {
                return err;
            }
            if db_err.is_unique_violation() {
                return AppError::Conflict("Registro duplicado.".into());
            }
            return AppError::Conflict("Registro referenciado por outros dados.".into());
        }
    }
    e.into()
}

/// Normaliza filtros de texto: string vazia vale como ausente.
pub(crate) fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_become_none() {
        assert_eq!(blank_to_none(None), None);
        assert_eq!(blank_to_none(Some("   ")), None);
        assert_eq!(blank_to_none(Some(" ana ")), Some("ana".to_string()));
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_constraint_error(sqlx::Error::RowNotFound, |_| None);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
