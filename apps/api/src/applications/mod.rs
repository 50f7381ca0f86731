// User applications: per-user tracking of roles, unique per (user, role).
// Owner-only: every query filters on the caller's id inside a user-scoped transaction.

pub mod handlers;
pub mod repository;
