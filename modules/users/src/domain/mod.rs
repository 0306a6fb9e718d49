pub mod error;
pub mod filter;
pub mod projection;
pub mod repo;
pub mod service;
