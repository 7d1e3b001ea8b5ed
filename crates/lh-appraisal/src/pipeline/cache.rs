use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::provider::{DataUnavailableError, LandDataProvider, Transaction, ZoningRecord};

#[derive(Debug, Clone)]
enum CachedValue {
    Zoning(ZoningRecord),
    Price(f64),
    Transactions(Vec<Transaction>),
}

/// Advisory TTL cache over a land-data provider.
///
/// Entries are keyed by a hash of (operation, normalized arguments) and are
/// best-effort only: a finalized appraisal never consults the cache again,
/// so staleness can delay but never corrupt a decision.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<u64, (Instant, CachedValue)>>,
}

impl<P: LandDataProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(operation: &str, parts: &[&str]) -> u64 {
        let mut hasher = DefaultHasher::new();
        operation.hash(&mut hasher);
        for part in parts {
            part.trim().hash(&mut hasher);
        }
        hasher.finish()
    }

    fn fetch(&self, key: u64) -> Option<CachedValue> {
        let mut guard = self.entries.lock().expect("cache mutex poisoned");
        match guard.get(&key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                guard.remove(&key);
                None
            }
            None => None,
        }
    }

    fn store(&self, key: u64, value: CachedValue) {
        let mut guard = self.entries.lock().expect("cache mutex poisoned");
        guard.insert(key, (Instant::now(), value));
    }
}

impl<P: LandDataProvider> LandDataProvider for CachedProvider<P> {
    fn get_zoning(&self, address: &str) -> Result<ZoningRecord, DataUnavailableError> {
        let key = Self::key("zoning", &[address]);
        if let Some(CachedValue::Zoning(record)) = self.fetch(key) {
            return Ok(record);
        }
        let record = self.inner.get_zoning(address)?;
        self.store(key, CachedValue::Zoning(record.clone()));
        Ok(record)
    }

    fn get_official_price(&self, address: &str) -> Result<f64, DataUnavailableError> {
        let key = Self::key("official_price", &[address]);
        if let Some(CachedValue::Price(price)) = self.fetch(key) {
            return Ok(price);
        }
        let price = self.inner.get_official_price(address)?;
        self.store(key, CachedValue::Price(price));
        Ok(price)
    }

    fn get_comparable_transactions(
        &self,
        address: &str,
        radius_m: f64,
        months: u32,
    ) -> Result<Vec<Transaction>, DataUnavailableError> {
        let radius = format!("{radius_m:.0}");
        let window = months.to_string();
        let key = Self::key("transactions", &[address, &radius, &window]);
        if let Some(CachedValue::Transactions(transactions)) = self.fetch(key) {
            return Ok(transactions);
        }
        let transactions = self
            .inner
            .get_comparable_transactions(address, radius_m, months)?;
        self.store(key, CachedValue::Transactions(transactions.clone()));
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl LandDataProvider for CountingProvider {
        fn get_zoning(&self, _address: &str) -> Result<ZoningRecord, DataUnavailableError> {
            Err(DataUnavailableError::NotFound)
        }

        fn get_official_price(&self, _address: &str) -> Result<f64, DataUnavailableError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(5_000_000.0)
        }

        fn get_comparable_transactions(
            &self,
            _address: &str,
            _radius_m: f64,
            _months: u32,
        ) -> Result<Vec<Transaction>, DataUnavailableError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn repeated_lookups_hit_the_cache_within_ttl() {
        let provider = CachedProvider::new(CountingProvider::default(), Duration::from_secs(60));
        let first = provider
            .get_official_price("서울시 강남구 역삼동 123-4")
            .expect("price");
        let second = provider
            .get_official_price("서울시 강남구 역삼동 123-4")
            .expect("price");
        assert_eq!(first, second);
        assert_eq!(provider.inner.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let provider = CachedProvider::new(CountingProvider::default(), Duration::from_secs(60));
        assert!(provider.get_zoning("어디든").is_err());
        assert!(provider.get_zoning("어디든").is_err());
    }
}
