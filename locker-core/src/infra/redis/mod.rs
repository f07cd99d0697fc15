mod lock_store;

pub use lock_store::RedisLockStore;
