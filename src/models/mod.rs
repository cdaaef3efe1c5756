use std::borrow::Cow;

use chrono::NaiveDate;
use validator::ValidationError;

pub mod catalog;
pub mod directory;
pub mod voting;

/// Calendar dates travel as `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("This field may not be blank.")));
    }
    Ok(())
}

fn iso_date(value: &str) -> Result<(), ValidationError> {
    if parse_date(value).is_none() {
        return Err(ValidationError::new("date_format").with_message(Cow::Borrowed(
            "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::catalog::{MenuCreateRequest, RestaurantCreateRequest};
    use super::directory::{EmployeeCreateRequest, UserPayload};
    use super::*;

    #[test]
    fn blank_and_oversized_restaurant_fields_fail() {
        let request = RestaurantCreateRequest {
            name: "x".repeat(256),
            address: "   ".to_string(),
            phone_number: Some("0".repeat(21)),
            cuisine_type: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("address"));
        assert!(fields.contains_key("phone_number"));
        assert!(!fields.contains_key("cuisine_type"));
    }

    #[test]
    fn menu_needs_restaurant_date_and_items() {
        let errors = MenuCreateRequest::default().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("restaurant"));
        assert!(fields.contains_key("date"));
        assert!(fields.contains_key("items"));

        let request = MenuCreateRequest {
            restaurant: Some(1),
            date: Some("2024-05-06".to_string()),
            items: "Soup".to_string(),
            votes: Some(-1),
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
        assert!(errors.field_errors().contains_key("votes"));
    }

    #[test]
    fn employee_user_is_validated_as_nested_struct() {
        let request = EmployeeCreateRequest {
            employee_id: "E-1".to_string(),
            user: Some(UserPayload {
                username: "jdoe".to_string(),
                email: "a@b.c d".to_string(),
            }),
            job_title: "Analyst".to_string(),
            department: "Finance".to_string(),
            date_of_joining: Some("2023-09-01".to_string()),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().is_empty());
        assert!(errors.errors().contains_key("user"));
    }

    #[test]
    fn dates_must_be_iso_calendar_days() {
        assert!(iso_date("2024-02-29").is_ok());
        assert!(iso_date("2023-02-29").is_err());
        assert!(iso_date("29/02/2024").is_err());
        assert_eq!(parse_date(" 2024-02-29 "), NaiveDate::from_ymd_opt(2024, 2, 29));
    }
}
