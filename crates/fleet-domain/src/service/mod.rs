//! Domain Services - Logic that doesn't belong to a single entity

pub mod relationship_index;
