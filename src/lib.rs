#![doc = "The `tasktracker` library crate."]
#![doc = ""]
#![doc = "Contains the domain models, forms layer, controllers, session-based"]
#![doc = "authentication, template rendering and route handlers for the task"]
#![doc = "tracker application. The binary (`main.rs`) wires these together into"]
#![doc = "an actix-web server."]

pub mod auth;
pub mod config;
pub mod controllers;
pub mod error;
pub mod forms;
pub mod models;
pub mod pages;
pub mod routes;

pub use error::AppError;
