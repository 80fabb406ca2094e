pub mod command;
pub mod delay;
pub mod engine;
pub mod jobs;
pub mod model;
pub mod observability;
pub mod scheduler;
pub mod sink;
