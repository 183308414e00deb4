//! Cache backends and read-through helpers.

pub mod aside;
pub mod backend;

pub use aside::{cache_aside, invalidate};
pub use backend::{RedisCache, create_cache_backend};
