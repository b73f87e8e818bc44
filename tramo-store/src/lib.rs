pub mod app_config;
pub mod memory;
pub mod redis_repo;

pub use memory::InMemoryStateStore;
pub use redis_repo::RedisStateStore;
