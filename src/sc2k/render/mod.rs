//! Rendering transforms driven by the decoded model.
//!
//! # Module Organization
//!
//! - [`projector`]: Grid cell + elevation to screen polygon, hit testing
//! - [`variants`]: Rotation-table and mirroring resolution of sprite ids
//! - [`rotator`]: Quarter-turn rotation of the whole grid
//! - [`atlas`]: Atlas manifest keys, source rectangles, page readiness
//! - [`pipeline`]: Back-to-front layered drawing against a host [`Surface`](pipeline::Surface)

pub mod atlas;
pub mod pipeline;
pub mod projector;
pub mod rotator;
pub mod variants;
