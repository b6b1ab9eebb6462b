//! Core Marquee library (config, services, notifications, remembered login).

pub mod config;
pub mod error;
pub mod logging;
pub mod recall;
pub mod services;
pub mod store;
pub mod toast;
pub mod validate;

pub use marquee_types as types;
