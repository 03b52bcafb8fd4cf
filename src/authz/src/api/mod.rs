//! Versioned token catalog document types

pub mod v1;
