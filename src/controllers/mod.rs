//! Query and mutation functions over the store. Handlers resolve
//! authentication and validation, then delegate every read/write here.

pub mod tasks;
pub mod users;
