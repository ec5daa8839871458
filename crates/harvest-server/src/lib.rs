//! HTTP front-end: the form page and its submission.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;
