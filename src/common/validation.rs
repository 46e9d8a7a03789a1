// src/common/validation.rs

use validator::ValidationError;

/// Mantém só os dígitos do CPF ("123.456.789-09" -> "12345678909").
pub fn normalize_cpf(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Dígitos de uma busca textual para comparar com o CPF; `None` quando não há nenhum.
pub fn cpf_search_digits(q: &str) -> Option<String> {
    let digits = normalize_cpf(q);
    if digits.is_empty() { None } else { Some(digits) }
}

/// Valida um CPF pelos dois dígitos verificadores.
pub fn is_valid_cpf(raw: &str) -> bool {
    let digits: Vec<u32> = normalize_cpf(raw)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return false;
    }
    // "111.111.111-11" e afins passam na conta, mas não são CPFs válidos
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check_digit = |len: usize| {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        match (sum * 10) % 11 {
            10 => 0,
            r => r,
        }
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

pub fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    if is_valid_cpf(cpf) {
        return Ok(());
    }
    let mut err = ValidationError::new("cpf");
    err.message = Some("O CPF informado é inválido.".into());
    Err(err)
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("O campo não pode ficar em branco.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_cpfs_with_or_without_mask() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
        assert!(is_valid_cpf("111.444.777-35"));
    }

    #[test]
    fn rejects_wrong_check_digits() {
        assert!(!is_valid_cpf("529.982.247-24"));
        assert!(!is_valid_cpf("111.444.777-53"));
    }

    #[test]
    fn rejects_repeated_digits_and_wrong_length() {
        assert!(!is_valid_cpf("111.111.111-11"));
        assert!(!is_valid_cpf("000.000.000-00"));
        assert!(!is_valid_cpf("5299822472"));
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn normalizes_mask() {
        assert_eq!(normalize_cpf("529.982.247-25"), "52998224725");
    }

    #[test]
    fn name_searches_do_not_match_every_cpf() {
        assert_eq!(cpf_search_digits("ana"), None);
        assert_eq!(cpf_search_digits("bruno@fyzen.com"), None);
        assert_eq!(cpf_search_digits("529.982"), Some("529982".to_string()));
    }

    #[test]
    fn blank_strings_fail_validation() {
        assert!(validate_not_blank("  ").is_err());
        assert!(validate_not_blank("Financeiro").is_ok());
    }
}
