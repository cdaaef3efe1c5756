//! Shared fixtures for unit tests: a migrated in-memory SQLite database and
//! seed helpers for the directory and catalog tables.

use chrono::NaiveDate;
use migration::MigratorTrait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection};

use crate::entities::{app_user, employee, menu, restaurant, vote};

pub async fn setup_database() -> DatabaseConnection {
    // Every pooled connection to `:memory:` would open its own empty database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("in-memory sqlite connects");
    migration::Migrator::up(&db, None)
        .await
        .expect("migrations apply to sqlite");
    db
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

pub async fn seed_employee(db: &DatabaseConnection, code: &str) -> employee::Model {
    let user = app_user::ActiveModel {
        id: NotSet,
        username: Set(format!("user-{}", code.to_ascii_lowercase())),
        email: Set(format!("{}@example.com", code.to_ascii_lowercase())),
    }
    .insert(db)
    .await
    .expect("user inserts");

    employee::ActiveModel {
        id: NotSet,
        employee_id: Set(code.to_string()),
        user_id: Set(user.id),
        job_title: Set("Engineer".to_string()),
        department: Set("Platform".to_string()),
        date_of_joining: Set(date(2022, 1, 10)),
    }
    .insert(db)
    .await
    .expect("employee inserts")
}

pub async fn seed_restaurant(db: &DatabaseConnection, name: &str) -> restaurant::Model {
    restaurant::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        address: Set(format!("1 {name} Street")),
        phone_number: Set(None),
        cuisine_type: Set(Some("Fusion".to_string())),
    }
    .insert(db)
    .await
    .expect("restaurant inserts")
}

pub async fn seed_menu(db: &DatabaseConnection, restaurant_id: i32, day: NaiveDate) -> menu::Model {
    menu::ActiveModel {
        id: NotSet,
        restaurant_id: Set(restaurant_id),
        date: Set(day),
        items: Set("Soup, salad, bread".to_string()),
        votes: Set(0),
    }
    .insert(db)
    .await
    .expect("menu inserts")
}

pub async fn insert_vote(
    db: &DatabaseConnection,
    menu_id: i32,
    employee_id: i32,
    points: i32,
    day: NaiveDate,
) -> vote::Model {
    vote::ActiveModel {
        id: NotSet,
        menu_id: Set(menu_id),
        employee_id: Set(employee_id),
        points: Set(points),
        voted_date: Set(day),
        rank: Set(None),
    }
    .insert(db)
    .await
    .expect("vote inserts")
}
