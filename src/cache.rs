use axum::async_trait;
use redis::AsyncCommands;
use tracing::debug;

/// Best-effort key-value cache in front of the debt store.
///
/// Implementations are not authoritative: callers treat every method as
/// fallible and degrade to direct store reads on error.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> anyhow::Result<()>;
    /// Removes every key starting with `prefix`.
    async fn delete_by_prefix(&self, prefix: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct RedisCache {
    con: redis::aio::MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let con = client.get_multiplexed_async_connection().await?;
        Ok(Self { con })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut con = self.con.clone();
        let value: Option<String> = con.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> anyhow::Result<()> {
        let mut con = self.con.clone();
        con.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> anyhow::Result<()> {
        let mut con = self.con.clone();
        let pattern = format!("{}*", prefix);
        let keys: Vec<String> = {
            let mut iter = con.scan_match::<_, String>(&pattern).await?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };
        if !keys.is_empty() {
            debug!(prefix = %prefix, count = keys.len(), "cache invalidated");
            con.del::<_, ()>(&keys).await?;
        }
        Ok(())
    }
}

/// In-memory stand-in for unit tests. Records TTLs but never expires.
#[derive(Default)]
pub struct MemoryCache {
    entries: std::sync::Mutex<std::collections::HashMap<String, (String, u64)>>,
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).map(|(v, _)| v.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (value.to_string(), ttl_seconds));
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|k, _| !k.starts_with(prefix));
        Ok(())
    }
}

impl MemoryCache {
    #[cfg(test)]
    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).map(|(_, ttl)| *ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_cache_set_get() {
        let cache = MemoryCache::default();
        cache.set("a", "1", 300).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), Some("1".into()));
        assert_eq!(cache.get("b").await.unwrap(), None);
        assert_eq!(cache.ttl_of("a"), Some(300));
    }

    #[tokio::test]
    async fn delete_by_prefix_only_removes_matching_keys() {
        let cache = MemoryCache::default();
        cache.set("debts:u1:list:ALL", "x", 300).await.unwrap();
        cache.set("debts:u1:summary", "y", 120).await.unwrap();
        cache.set("debts:u2:summary", "z", 120).await.unwrap();

        cache.delete_by_prefix("debts:u1:").await.unwrap();

        assert_eq!(cache.get("debts:u1:list:ALL").await.unwrap(), None);
        assert_eq!(cache.get("debts:u1:summary").await.unwrap(), None);
        assert_eq!(cache.get("debts:u2:summary").await.unwrap(), Some("z".into()));
    }
}
