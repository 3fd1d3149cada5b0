//! Core types shared by the thread view mediator (config, snapshots, collaborators).

pub mod bus;
pub mod config;
pub mod data;
pub mod hint;
pub mod logging;
pub mod model;
