use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{iso_date, not_blank};
use crate::entities::{app_user, employee};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UserPayload {
    #[validate(
        custom(function = "not_blank"),
        length(max = 150, message = "Ensure this field has no more than 150 characters.")
    )]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct EmployeeCreateRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub employee_id: String,
    #[validate(required(message = "This field is required."), nested)]
    pub user: Option<UserPayload>,
    #[validate(custom(function = "not_blank"))]
    pub job_title: String,
    #[validate(custom(function = "not_blank"))]
    pub department: String,
    #[validate(
        required(message = "This field is required."),
        custom(function = "iso_date")
    )]
    pub date_of_joining: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeView {
    /// Identifier submitted as `employee_id` when voting.
    pub id: i32,
    pub employee_id: String,
    pub user: UserPayload,
    pub job_title: String,
    pub department: String,
    pub date_of_joining: NaiveDate,
}

impl EmployeeView {
    pub fn new(employee: employee::Model, user: app_user::Model) -> Self {
        Self {
            id: employee.id,
            employee_id: employee.employee_id,
            user: UserPayload {
                username: user.username,
                email: user.email,
            },
            job_title: employee.job_title,
            department: employee.department,
            date_of_joining: employee.date_of_joining,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeCreatedResponse {
    pub msg: &'static str,
    pub data: EmployeeView,
    pub success: bool,
}
