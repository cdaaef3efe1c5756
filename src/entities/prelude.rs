#![allow(unused_imports)]

pub use super::app_user::Entity as AppUser;
pub use super::employee::Entity as Employee;
pub use super::menu::Entity as Menu;
pub use super::restaurant::Entity as Restaurant;
pub use super::vote::Entity as Vote;
