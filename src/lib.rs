pub mod cli;
pub mod commands;
pub mod config;
pub mod deploy;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod network;
pub mod rpc;
pub mod tx_builder;
