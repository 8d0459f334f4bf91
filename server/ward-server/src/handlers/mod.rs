pub mod assignments;
pub mod auth;
pub mod billing;
pub mod discharge;
pub mod health;
pub mod iv_items;
pub mod patients;
