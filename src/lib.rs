// src/lib.rs — Library root for recipe-sweep

pub mod cli;
pub mod core;
pub mod dss;
pub mod infra;
