// src/lib.rs

//! ecart: an e-commerce backend.
//!
//! Customers browse a catalog of categories and brands, keep a cart and place
//! orders; admins maintain the catalog and customer accounts. Multi-step
//! processes (signup, login, add-to-cart, checkout) run as `ecart_flow`
//! workflows over pluggable stores (PostgreSQL or in-memory).

pub mod config;
pub mod dto;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
