use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::Entity;
use crate::errors::{ApplicationError, Violation};

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z]*$").expect("name pattern compiles"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub Uuid);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CustomerId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

impl From<Uuid> for CustomerId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    #[validate(
        length(min = 3, max = 32, message = "first name must be between 3 and 32 characters"),
        regex(
            path = *NAME_PATTERN,
            message = "first name must start with an uppercase letter followed by letters only"
        )
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, max = 32, message = "last name must be between 1 and 32 characters"),
        regex(
            path = *NAME_PATTERN,
            message = "last name must start with an uppercase letter followed by letters only"
        )
    )]
    pub last_name: String,
    #[serde(deserialize_with = "deserialize_date_of_birth")]
    pub date_of_birth: NaiveDate,
}

impl Entity for Customer {
    type Id = CustomerId;

    const KIND: &'static str = "customer";

    fn id(&self) -> &CustomerId {
        &self.id
    }
}

impl Customer {
    /// True when either name contains `text`, ignoring ASCII case. An empty needle matches.
    ///
    /// Folding is ASCII-only so results agree with SQLite's `upper()`.
    pub fn name_contains(&self, text: &str) -> bool {
        let needle = text.to_ascii_uppercase();
        self.first_name.to_ascii_uppercase().contains(&needle)
            || self.last_name.to_ascii_uppercase().contains(&needle)
    }

    /// Runs the field constraints and folds every violation into one error.
    pub fn ensure_valid(&self) -> Result<(), ApplicationError> {
        self.validate().map_err(|errors| ApplicationError::Validation(violations(&errors)))
    }
}

fn violations(errors: &ValidationErrors) -> Vec<Violation> {
    let mut violations: Vec<Violation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let location = format!("$.{}", camel_case(&field.to_string()));
            field_errors.iter().map(move |error| Violation {
                location: location.clone(),
                message: error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("failed `{}` check", error.code)),
            })
        })
        .collect();
    violations.sort_by(|left, right| {
        left.location.cmp(&right.location).then_with(|| left.message.cmp(&right.message))
    });
    violations
}

fn camel_case(field: &str) -> String {
    let mut output = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            output.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            output.push(ch);
        }
    }
    output
}

fn deserialize_date_of_birth<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid dateOfBirth `{raw}` (expected YYYY-MM-DD or an ISO 8601 date-time)"
        ))
    })
}

/// Accepts `2000-04-06`, `2000-04-6`, `2000-04-06T00:00:00` and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::{parse_date, Customer, CustomerId};
    use crate::errors::ApplicationError;

    fn customer(first_name: &str, last_name: &str) -> Customer {
        Customer {
            id: CustomerId(Uuid::nil()),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 4, 6).expect("valid date"),
        }
    }

    #[test]
    fn well_formed_customer_passes_validation() {
        assert!(customer("Mallik", "Alinta").ensure_valid().is_ok());
        assert!(customer("Udaya", "A").ensure_valid().is_ok());
    }

    #[test]
    fn short_first_name_is_rejected() {
        let error = customer("Al", "Alinta").ensure_valid().expect_err("too short");

        let ApplicationError::Validation(violations) = error else {
            panic!("expected validation error, got {error:?}");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location, "$.firstName");
        assert!(violations[0].message.contains("between 3 and 32"));
    }

    fn name_of(len: usize) -> String {
        format!("A{}", "a".repeat(len - 1))
    }

    fn locations(record: &Customer) -> Vec<String> {
        match record.ensure_valid() {
            Ok(()) => Vec::new(),
            Err(ApplicationError::Validation(violations)) => {
                violations.into_iter().map(|violation| violation.location).collect()
            }
            Err(other) => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn first_name_length_bounds_are_inclusive() {
        assert!(locations(&customer(&name_of(3), "Alinta")).is_empty());
        assert!(locations(&customer(&name_of(32), "Alinta")).is_empty());
        assert_eq!(locations(&customer(&name_of(33), "Alinta")), vec!["$.firstName"]);
    }

    #[test]
    fn last_name_length_bounds_are_inclusive() {
        assert!(locations(&customer("Mallik", &name_of(1))).is_empty());
        assert!(locations(&customer("Mallik", &name_of(32))).is_empty());
        assert_eq!(locations(&customer("Mallik", &name_of(33))), vec!["$.lastName"]);
    }

    #[test]
    fn lowercase_and_non_letter_names_are_rejected() {
        assert!(customer("mallik", "Alinta").ensure_valid().is_err());
        assert!(customer("Mallik", "Alinta2").ensure_valid().is_err());
        assert!(customer("Mal lik", "Alinta").ensure_valid().is_err());
    }

    #[test]
    fn every_violation_is_reported_in_stable_order() {
        let error = customer("ab", "Z1").ensure_valid().expect_err("both names invalid");

        let ApplicationError::Validation(violations) = error else {
            panic!("expected validation error, got {error:?}");
        };
        let locations: Vec<&str> = violations.iter().map(|v| v.location.as_str()).collect();
        assert_eq!(locations, vec!["$.firstName", "$.firstName", "$.lastName"]);
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let record = customer("Mallik", "Alinta");

        assert!(record.name_contains("alin"));
        assert!(record.name_contains("LIK"));
        assert!(record.name_contains(""));
        assert!(!record.name_contains("Udaya"));
    }

    #[test]
    fn name_match_does_not_expand_unicode_case() {
        let record = customer("Ross", "Jeff");

        assert!(!record.name_contains("ß"));
        assert!(!record.name_contains("\u{fb00}"));
        assert!(record.name_contains("ss"));
    }

    #[test]
    fn json_uses_camel_case_fields_and_plain_date() {
        let record = customer("Mallik", "Alinta");
        let json = serde_json::to_value(&record).expect("serialize");

        assert_eq!(json["id"], Uuid::nil().to_string());
        assert_eq!(json["firstName"], "Mallik");
        assert_eq!(json["lastName"], "Alinta");
        assert_eq!(json["dateOfBirth"], "2000-04-06");
    }

    #[test]
    fn date_of_birth_accepts_date_times_from_clients() {
        let body = r#"{
            "id": "ef743a6d-e780-4406-9fd7-6e398db82adc",
            "firstName": "Mallik",
            "lastName": "Alinta",
            "dateOfBirth": "2000-04-06T00:00:00"
        }"#;
        let parsed: Customer = serde_json::from_str(body).expect("deserialize");

        assert_eq!(parsed.date_of_birth, NaiveDate::from_ymd_opt(2000, 4, 6).expect("date"));
        assert_eq!(parse_date("2000-04-6"), NaiveDate::from_ymd_opt(2000, 4, 6));
        assert_eq!(
            parse_date("1999-12-31T23:00:00+00:00"),
            NaiveDate::from_ymd_opt(1999, 12, 31)
        );
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn missing_field_fails_to_deserialize() {
        let body = r#"{"id": "ef743a6d-e780-4406-9fd7-6e398db82adc", "firstName": "Mallik"}"#;

        assert!(serde_json::from_str::<Customer>(body).is_err());
    }
}
