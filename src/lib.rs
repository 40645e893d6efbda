//! Orderform
//!
//! Order-capture pipeline for a browser-side order widget: cart state
//! management, normalisation of raw form snapshots into priced order
//! summaries, composition of a backend-agnostic printable document, and
//! dispatch of order notifications through an external email service.
//!
//! Rendering engines, email transport and browser download mechanics are
//! external collaborators behind traits; everything in this crate is the
//! deterministic data pipeline between them.

pub mod assets;
pub mod cart;
pub mod config;
pub mod delivery;
pub mod document;
pub mod download;
pub mod money;
pub mod order;
pub mod render;
pub mod submit;
