use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{iso_date, not_blank};
use crate::entities::{menu, restaurant};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct RestaurantCreateRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub address: String,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub phone_number: Option<String>,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub cuisine_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantView {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub cuisine_type: Option<String>,
}

impl From<restaurant::Model> for RestaurantView {
    fn from(model: restaurant::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            phone_number: model.phone_number,
            cuisine_type: model.cuisine_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct MenuCreateRequest {
    #[validate(required(message = "This field is required."))]
    pub restaurant: Option<i32>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "iso_date")
    )]
    pub date: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub items: String,
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub votes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuView {
    pub id: i32,
    pub restaurant: i32,
    pub items: String,
    pub date: NaiveDate,
    pub votes: i32,
}

impl From<menu::Model> for MenuView {
    fn from(model: menu::Model) -> Self {
        Self {
            id: model.id,
            restaurant: model.restaurant_id,
            items: model.items,
            date: model.date,
            votes: model.votes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedResponse<T> {
    pub message: &'static str,
    pub data: T,
}
