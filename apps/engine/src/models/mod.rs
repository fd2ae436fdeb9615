// Core data model for the evaluation engine.
// Persistence rows and HTTP DTOs live with the platform layer, not here.

pub mod interview;
pub mod resume;
