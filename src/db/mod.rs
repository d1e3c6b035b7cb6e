pub mod cached;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use cached::CachedInteractionStore;
pub use memory::MemoryInteractionStore;
pub use postgres::{create_pool, run_migrations, PgInteractionStore};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use store::InteractionStore;
