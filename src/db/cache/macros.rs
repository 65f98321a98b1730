/// Read-through caching around an async computation.
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues
/// the result for a background write and returns it. A failed cache read is
/// logged and handled as a miss; it never fails the surrounding call.
///
/// # Arguments
/// * `$cache`: a `Cache` (anything with `get_from_cache` and `set_in_background`).
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: future producing an `AppResult` of the value on a miss.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::CatalogDetails(id), ttl, async move {
///     self.inner.details(id).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let lookup = $cache.get_from_cache(&key).await;
        match lookup {
            Ok(Some(hit)) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(hit)
            }
            lookup => {
                match lookup {
                    Err(e) => tracing::warn!(
                        error = %e,
                        key = %key,
                        "Cache read failed, fetching without memoization"
                    ),
                    _ => tracing::debug!(key = %key, "Cache miss"),
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
