use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::models::Role;
use crate::error::ApiError;

/// SQL query builder for the patient list
/// Builds a single parameterized SELECT with optional name and birth-date filters
pub struct PatientQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
}

impl PatientQueryBuilder {
    /// Creates a builder selecting the given columns from `patients`
    pub fn new(columns: &str) -> Self {
        Self {
            base_query: format!("SELECT {} FROM patients", columns),
            where_clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Adds a case-sensitive substring match on the name
    /// `instr` keeps `%` and `_` in the search term literal
    pub fn add_name_filter(&mut self, name: &str) {
        self.where_clauses.push("instr(name, ?) > 0".to_string());
        self.params.push(name.to_string());
    }

    /// Adds an inclusive birth-date range
    /// Dates are stored as ISO `YYYY-MM-DD` text, so string comparison is date order
    pub fn add_birth_date_range(&mut self, from: chrono::NaiveDate, to: chrono::NaiveDate) {
        self.where_clauses.push("birth_date BETWEEN ? AND ?".to_string());
        self.params.push(from.format("%Y-%m-%d").to_string());
        self.params.push(to.format("%Y-%m-%d").to_string());
    }

    /// Builds the final SQL query string with all parameters
    /// Returns a tuple of (query_string, parameters) in bind order
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = self.base_query.clone();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        query.push_str(" ORDER BY id");

        (query, self.params.clone())
    }
}

/// Query parameters of `GET /pacients`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientListParams {
    /// Case-sensitive substring of the patient name
    pub name: Option<String>,
    /// Exact age in completed years
    pub age: Option<String>,
}

/// Query parameters of `GET /users`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    /// Comma-separated roles, e.g. `doctor,receptionist`
    pub roles: Option<String>,
}

/// Validated and normalized patient filters
#[derive(Debug, PartialEq, Eq)]
pub struct PatientFilter {
    /// Name term (None if empty)
    pub name: Option<String>,
    /// Target age (None if not filtering)
    pub age: Option<u32>,
}

/// Query parameter validator
pub struct QueryValidator;

impl QueryValidator {
    /// Validates and normalizes the patient list parameters
    pub fn patient_filter(params: PatientListParams) -> Result<PatientFilter, ApiError> {
        let name = params.name.filter(|name| !name.trim().is_empty());

        let age = match Self::normalize_string(params.age) {
            Some(raw) => Some(Self::parse_age(&raw)?),
            None => None,
        };

        Ok(PatientFilter { name, age })
    }

    /// Parses a comma-separated role list; empty means "all roles"
    pub fn role_filter(params: UserListParams) -> Result<Vec<Role>, ApiError> {
        let Some(raw) = params.roles else {
            return Ok(Vec::new());
        };

        let mut roles = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let role = part
                .parse::<Role>()
                .map_err(|_| ApiError::InvalidArgument(format!("Invalid role: '{}'", part)))?;
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        Ok(roles)
    }

    /// Normalizes string parameters by trimming whitespace
    /// Returns None if the string is empty or whitespace-only
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    /// Age must be a non-negative integer
    fn parse_age(raw: &str) -> Result<u32, ApiError> {
        raw.parse::<u32>()
            .map_err(|_| ApiError::InvalidArgument(format!("Invalid age: '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn params(name: Option<&str>, age: Option<&str>) -> PatientListParams {
        PatientListParams {
            name: name.map(str::to_string),
            age: age.map(str::to_string),
        }
    }

    #[test]
    fn test_builder_basic_query() {
        let builder = PatientQueryBuilder::new("id, name");
        let (query, params) = builder.build();

        assert_eq!(query, "SELECT id, name FROM patients ORDER BY id");
        assert!(params.is_empty());
    }

    #[test]
    fn test_builder_with_name_filter() {
        let mut builder = PatientQueryBuilder::new("*");
        builder.add_name_filter("Jane");
        let (query, params) = builder.build();

        assert!(query.contains("WHERE instr(name, ?) > 0"));
        assert_eq!(params, vec!["Jane".to_string()]);
    }

    #[test]
    fn test_builder_combined_filters() {
        let mut builder = PatientQueryBuilder::new("*");
        builder.add_name_filter("Doe");
        builder.add_birth_date_range(
            NaiveDate::from_ymd_opt(1993, 6, 16).unwrap(),
            NaiveDate::from_ymd_opt(1994, 6, 15).unwrap(),
        );
        let (query, params) = builder.build();

        assert!(query.contains("instr(name, ?) > 0 AND birth_date BETWEEN ? AND ?"));
        assert!(query.ends_with("ORDER BY id"));
        assert_eq!(params, vec!["Doe", "1993-06-16", "1994-06-15"]);
    }

    #[test]
    fn test_patient_filter_normalization() {
        let filter = QueryValidator::patient_filter(params(Some("  "), Some(" 30 "))).unwrap();
        assert_eq!(filter, PatientFilter { name: None, age: Some(30) });

        let filter = QueryValidator::patient_filter(params(Some("Jane"), Some(""))).unwrap();
        assert_eq!(filter, PatientFilter { name: Some("Jane".to_string()), age: None });
    }

    #[test]
    fn test_invalid_age_rejected() {
        for bad in ["abc", "-1", "3.5", "99999999999"] {
            let result = QueryValidator::patient_filter(params(None, Some(bad)));
            assert!(matches!(result, Err(ApiError::InvalidArgument(_))), "{}", bad);
        }
    }

    #[test]
    fn test_role_filter() {
        let roles = QueryValidator::role_filter(UserListParams {
            roles: Some("doctor, receptionist,doctor".to_string()),
        })
        .unwrap();
        assert_eq!(roles, vec![Role::Doctor, Role::Receptionist]);

        assert!(QueryValidator::role_filter(UserListParams::default()).unwrap().is_empty());
        assert!(QueryValidator::role_filter(UserListParams { roles: Some(String::new()) })
            .unwrap()
            .is_empty());
        assert!(QueryValidator::role_filter(UserListParams {
            roles: Some("doctor,nurse".to_string())
        })
        .is_err());
    }

    proptest! {
        #[test]
        fn prop_any_non_negative_age_accepted(age in 0u32..=u32::MAX) {
            let filter = QueryValidator::patient_filter(params(None, Some(&age.to_string())))?;
            prop_assert_eq!(filter.age, Some(age));
        }

        #[test]
        fn prop_whitespace_name_means_no_filter(ws in "[ \t]{0,8}") {
            let filter = QueryValidator::patient_filter(params(Some(&ws), None))?;
            prop_assert!(filter.name.is_none());
        }
    }
}
