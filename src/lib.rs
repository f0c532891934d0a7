pub mod catalog;
pub mod config;
pub mod i18n;
pub mod preferences;
pub mod pricing;
pub mod proxy;
pub mod rate;
pub mod session;
pub mod store;
