/// Serves a value from the cache, computing and storing it on a miss.
///
/// Expands to an expression of type `AppResult<T>`. The enclosing function
/// must return `AppResult` since cache reads propagate with `?`.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::db::Cache)
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write
/// * `$ttl`: time-to-live in seconds for a freshly computed value
/// * `$block`: a future producing `AppResult<T>`, awaited only on a miss
///
/// # Example
/// ```rust,ignore
/// let page: AppResult<SuggestionPage> =
///     cached!(cache, key, 300, engine.suggestions_for_movie(&movie, request));
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
