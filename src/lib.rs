pub mod cli;
pub mod config;
pub mod controller;
pub mod drivers;
pub mod input;
pub mod session;
pub mod transport;
