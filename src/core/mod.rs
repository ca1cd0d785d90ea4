//! Core application modules
//!
//! This module contains configuration, constants, logging, errors, the
//! broadcast bus, the serial executor and the chat collaborator contracts.

pub mod bus;
pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod logging;
pub mod provider;
