pub mod api;
pub mod auth;
pub mod cli;
pub mod datastore;
pub mod i18n;
