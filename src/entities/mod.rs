pub mod prelude;

pub mod app_user;
pub mod employee;
pub mod menu;
pub mod restaurant;
pub mod vote;

use sea_orm::{DbErr, SqlErr};

/// True when the database rejected a write because of a unique index.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
