//! Core configuration types

pub mod config;
