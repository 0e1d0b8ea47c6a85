pub mod config;
pub mod logging;

pub mod archive;
pub mod coordinator;
pub mod dataset;
pub mod fetch;
pub mod harvest;
pub mod orchestrator;
pub mod playlist;
pub mod retry;
