//! Policygraph Core Types and Definitions
//!
//! This crate provides the foundational types shared by the policy
//! connectivity graph engine. It includes:
//!
//! - **Identifiers**: Interned entity identifiers ([`identifier::Id`])
//! - **Colors**: CSS color handling for styling ([`color::Color`])
//! - **Geometry**: Points, sizes, and bounding boxes ([`geometry`] module)
//! - **Entities**: Records consumed from the data layer ([`entity`] module)

pub mod color;
pub mod entity;
pub mod geometry;
pub mod identifier;
