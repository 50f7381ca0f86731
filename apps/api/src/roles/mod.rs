// Role catalogue: public, read-only view over scraped listings.

pub mod availability;
pub mod handlers;
pub mod repository;
