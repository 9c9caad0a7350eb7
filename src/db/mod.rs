pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::{CatalogSeed, InMemoryStore};
pub use postgres::{create_pool, PgStore};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;
