//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure business logic
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - External dependency implementations

// Schema of the source data model (input)
pub mod metamodel;

// Two-phase vertex/edge materialization (output)
pub mod model_graph;
