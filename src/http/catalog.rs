use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::info;

use crate::entities::prelude::{Menu, Restaurant};
use crate::entities::{is_unique_violation, menu, restaurant};
use crate::models::catalog::{
    CreatedResponse, MenuCreateRequest, MenuView, RestaurantCreateRequest, RestaurantView,
};
use crate::state::AppState;

use super::{ApiJson, HttpError, collect_validation, parse_date, push_error, single_error};

const DUPLICATE_RESTAURANT: &str = "restaurant with this name already exists.";
const DUPLICATE_MENU: &str = "The fields restaurant, date must make a unique set.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route("/restaurants/{restaurant_id}/menus", get(list_restaurant_menus))
        .route("/menus", post(create_menu))
        .route("/menus/today", get(list_today_menus))
}

async fn create_restaurant(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RestaurantCreateRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<RestaurantView>>), HttpError> {
    const FAILURE: &str = "An error occurred during restaurant creation.";

    let mut errors = collect_validation(&request);
    let name = request.name.trim();
    if !name.is_empty() {
        let existing = Restaurant::find()
            .filter(restaurant::Column::Name.eq(name))
            .count(&state.database)
            .await
            .map_err(|err| HttpError::internal(FAILURE, err))?;
        if existing > 0 {
            push_error(&mut errors, "name", DUPLICATE_RESTAURANT);
        }
    }
    if !errors.is_empty() {
        return Err(HttpError::validation(errors));
    }

    let created = restaurant::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        address: Set(request.address.trim().to_string()),
        phone_number: Set(optional_text(request.phone_number.as_deref())),
        cuisine_type: Set(optional_text(request.cuisine_type.as_deref())),
    }
    .insert(&state.database)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            single_error("name", DUPLICATE_RESTAURANT)
        } else {
            HttpError::internal(FAILURE, err)
        }
    })?;

    info!("Restaurant {} created: {}", created.id, created.name);
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Restaurant created successfully.",
            data: created.into(),
        }),
    ))
}

async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantView>>, HttpError> {
    let restaurants = Restaurant::find()
        .order_by_asc(restaurant::Column::Name)
        .all(&state.database)
        .await
        .map_err(|err| HttpError::internal("Failed to load restaurants.", err))?;

    Ok(Json(restaurants.into_iter().map(RestaurantView::from).collect()))
}

async fn create_menu(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<MenuCreateRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<MenuView>>), HttpError> {
    const FAILURE: &str = "An error occurred during menu creation.";

    let mut errors = collect_validation(&request);
    if let Some(id) = request.restaurant {
        let found = Restaurant::find_by_id(id)
            .count(&state.database)
            .await
            .map_err(|err| HttpError::internal(FAILURE, err))?;
        if found == 0 {
            push_error(
                &mut errors,
                "restaurant",
                format!("Invalid pk \"{id}\" - object does not exist."),
            );
        }
    }
    if !errors.is_empty() {
        return Err(HttpError::validation(errors));
    }

    let date = request.date.as_deref().and_then(parse_date);
    let (Some(restaurant_id), Some(date)) = (request.restaurant, date) else {
        return Err(HttpError::bad_request("Menu requires a restaurant and a date."));
    };

    let duplicates = Menu::find()
        .filter(menu::Column::RestaurantId.eq(restaurant_id))
        .filter(menu::Column::Date.eq(date))
        .count(&state.database)
        .await
        .map_err(|err| HttpError::internal(FAILURE, err))?;
    if duplicates > 0 {
        return Err(single_error("non_field_errors", DUPLICATE_MENU));
    }

    let created = menu::ActiveModel {
        id: NotSet,
        restaurant_id: Set(restaurant_id),
        date: Set(date),
        items: Set(request.items.trim().to_string()),
        votes: Set(request.votes.unwrap_or(0)),
    }
    .insert(&state.database)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            single_error("non_field_errors", DUPLICATE_MENU)
        } else {
            HttpError::internal(FAILURE, err)
        }
    })?;

    info!(
        "Menu {} created for restaurant {} on {}",
        created.id, created.restaurant_id, created.date
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Menu item created successfully.",
            data: created.into(),
        }),
    ))
}

async fn list_today_menus(State(state): State<AppState>) -> Result<Json<Vec<MenuView>>, HttpError> {
    let menus = Menu::find()
        .filter(menu::Column::Date.eq(state.today()))
        .order_by_asc(menu::Column::Id)
        .all(&state.database)
        .await
        .map_err(|err| HttpError::internal("Failed to load today's menus.", err))?;

    Ok(Json(menus.into_iter().map(MenuView::from).collect()))
}

async fn list_restaurant_menus(
    Path(restaurant_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MenuView>>, HttpError> {
    let owner = Restaurant::find_by_id(restaurant_id)
        .one(&state.database)
        .await
        .map_err(|err| HttpError::internal("Failed to load restaurant.", err))?
        .ok_or_else(|| {
            HttpError::new(
                StatusCode::NOT_FOUND,
                format!("Restaurant {restaurant_id} not found"),
            )
        })?;

    let menus = Menu::find()
        .filter(menu::Column::RestaurantId.eq(owner.id))
        .order_by_desc(menu::Column::Date)
        .all(&state.database)
        .await
        .map_err(|err| HttpError::internal("Failed to load menus.", err))?;

    Ok(Json(menus.into_iter().map(MenuView::from).collect()))
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
