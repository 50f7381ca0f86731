// User profiles: one row per authenticated identity, edited via the profile form.
// All reads and writes run inside a user-scoped transaction (see db::begin_user_scope).

pub mod completeness;
pub mod handlers;
pub mod repository;
