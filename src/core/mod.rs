// src/core/mod.rs — Discovery, work list, and the bounded recipe runner

pub mod discovery;
pub mod results;
pub mod runner;
pub mod types;
pub mod worklist;
