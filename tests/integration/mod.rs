//! Integration tests for the cidnav file manager core

mod cli_contracts;
mod drop_walk;
mod navigation;
mod support;
mod tree_sync;
mod upload_flow;
