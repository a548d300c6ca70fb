#![allow(dead_code)]

pub mod app;
pub mod factory;
pub mod server;

pub use app::TestApp;
pub use factory::Factory;
