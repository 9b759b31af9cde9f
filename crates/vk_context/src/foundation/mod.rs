//! Foundation module - logging setup shared by the library and applications

pub mod logging;
