/// Read-through caching for store lookups.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`,
/// queues the result for a background write with `$ttl` seconds to live, and
/// returns it. A failed cache read is logged and treated as a miss without a
/// write-back, so an unavailable Redis only costs speed. Must be used inside a
/// function returning `AppResult`.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::LikedBy(slug.to_string()), self.ttl, async move {
///     self.inner.find_users_who_liked(slug).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            lookup => {
                let cache_readable = match &lookup {
                    Ok(_) => {
                        tracing::debug!(key = %key, "Cache miss");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Cache read failed, using store");
                        false
                    }
                };
                let value = $block.await?;
                if cache_readable {
                    $cache.set_in_background(&key, &value, $ttl);
                }
                Ok(value)
            }
        }
    }};
}
