// handlers/mod.rs - Request handlers
//
// crud:       generic create/list/get/update/delete shared by every resource
// invariants: cross-entity business rules evaluated before writes
// system:     service info and health

pub mod crud;
pub mod invariants;
pub mod system;
