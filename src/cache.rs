use crate::model::Candle;
use crate::screener::{CandleSource, TimeInterval};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error;

/// 캔들 캐시 오류
#[derive(Debug, Error, PartialEq)]
pub enum CacheError {
    /// 저장소 접근 실패 (잠금 오염 등)
    #[error("캐시 저장소 오류: {0}")]
    Storage(String),
}

/// 캐시 키
///
/// 같은 종목과 주기라도 데이터 버전이 다르면 다른 항목입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub interval: TimeInterval,
    pub data_version: u64,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, interval: TimeInterval, data_version: u64) -> Self {
        CacheKey {
            symbol: symbol.into(),
            interval,
            data_version,
        }
    }
}

struct CacheEntry {
    candles: Vec<Candle>,
    stored_at: Instant,
}

/// TTL 기반 메모리 캔들 캐시
///
/// 만료된 항목은 조회 시 없는 것으로 취급하고, `purge_expired`에서 실제로 제거합니다.
pub struct CandleCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl CandleCache {
    /// 새 캐시 생성
    ///
    /// # Arguments
    /// * `ttl` - 항목 유효 시간
    pub fn new(ttl: Duration) -> Self {
        CandleCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CacheKey, CacheEntry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|e| CacheError::Storage(e.to_string()))
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }

    /// 유효한 캐시 항목 조회
    ///
    /// # Returns
    /// * `Result<Option<Vec<Candle>>, CacheError>` - 없거나 만료되었으면 None
    pub fn get(&self, key: &CacheKey) -> Result<Option<Vec<Candle>>, CacheError> {
        let entries = self.lock()?;
        Ok(entries
            .get(key)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.candles.clone()))
    }

    /// 항목 저장. 같은 키가 있으면 덮어씁니다.
    pub fn insert(&self, key: CacheKey, candles: Vec<Candle>) -> Result<(), CacheError> {
        let mut entries = self.lock()?;
        log::trace!(
            "캔들 캐시 저장: {} {} v{} ({}개)",
            key.symbol,
            key.interval,
            key.data_version,
            candles.len()
        );
        entries.insert(
            key,
            CacheEntry {
                candles,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// 항목 하나 제거
    ///
    /// # Returns
    /// * `Result<bool, CacheError>` - 제거된 항목이 있었는지 여부
    pub fn invalidate(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.lock()?.remove(key).is_some())
    }

    /// 종목의 모든 주기/버전 항목 제거
    ///
    /// # Returns
    /// * `Result<usize, CacheError>` - 제거된 항목 수
    pub fn invalidate_symbol(&self, symbol: &str) -> Result<usize, CacheError> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|key, _| key.symbol != symbol);
        Ok(before - entries.len())
    }

    /// 만료된 항목 제거
    ///
    /// # Returns
    /// * `Result<usize, CacheError>` - 제거된 항목 수
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            log::debug!("만료된 캔들 캐시 {removed}개 제거");
        }
        Ok(removed)
    }

    /// 저장된 항목 수 (만료 항목 포함)
    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.lock()?.is_empty())
    }
}

/// 캐시를 거치는 캔들 공급자
///
/// 캐시에 없을 때만 내부 공급자를 호출합니다.
pub struct CachedCandleSource<S> {
    inner: S,
    cache: CandleCache,
    data_version: u64,
}

impl<S: CandleSource> CachedCandleSource<S> {
    pub fn new(inner: S, cache: CandleCache, data_version: u64) -> Self {
        CachedCandleSource {
            inner,
            cache,
            data_version,
        }
    }

    pub fn cache(&self) -> &CandleCache {
        &self.cache
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CandleSource> CandleSource for CachedCandleSource<S> {
    async fn fetch(&self, symbol: &str, interval: TimeInterval) -> anyhow::Result<Vec<Candle>> {
        let key = CacheKey::new(symbol, interval, self.data_version);
        if let Some(candles) = self.cache.get(&key)? {
            log::trace!("캔들 캐시 적중: {symbol} {interval}");
            return Ok(candles);
        }

        let candles = self.inner.fetch(symbol, interval).await?;
        self.cache.insert(key, candles.clone())?;
        Ok(candles)
    }
}
