//! # API Module
//!
//! HTTP handlers for the Polkaquery server.
//!
//! ## Available Endpoints
//!
//! - `POST /query` - Answer a natural-language question about a network
//! - `GET /health` - Liveness check
//! - `GET /tools` - List the loaded tool catalog

pub mod health;
pub mod query;
pub mod tools;
