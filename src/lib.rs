pub mod auth;
pub mod commercials;
pub mod config;
pub mod constants;
pub mod crud;
pub mod dashboard;
pub mod database;
pub mod entity;
pub mod error;
pub mod finances;
pub mod flash;
pub mod models;
pub mod programmes;
pub mod routes;
pub mod serverless;
pub mod store;
pub mod todos;
pub mod validation;
pub mod views;
