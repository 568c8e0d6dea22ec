// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod config;
pub mod graph;
pub mod lineage;
pub mod progress;
pub mod reader;
pub mod record;
