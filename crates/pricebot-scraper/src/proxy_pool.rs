//! Cyclic, shareable supply of upstream relays.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pricebot_core::ProxyDescriptor;

/// The canonical proxy list plus a shared rotation cursor.
///
/// The list itself is immutable after construction; the only shared mutable
/// state is the atomic cursor, so readers never block each other. Clones share
/// both the list and the cursor.
#[derive(Debug, Clone)]
pub struct ProxyPool {
    proxies: Arc<[ProxyDescriptor]>,
    cursor: Arc<AtomicUsize>,
}

impl ProxyPool {
    #[must_use]
    pub fn new(proxies: Vec<ProxyDescriptor>) -> Self {
        Self {
            proxies: proxies.into(),
            cursor: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    #[must_use]
    pub fn proxies(&self) -> &[ProxyDescriptor] {
        &self.proxies
    }

    /// Next proxy in rotation, wrapping around at the end of the list.
    ///
    /// Returns `None` only when the pool was configured empty.
    #[must_use]
    pub fn next(&self) -> Option<ProxyDescriptor> {
        let index = self.advance()?;
        Some(self.proxies[index].clone())
    }

    /// A private copy of the pool for one fetch, starting at the next cursor
    /// position so concurrent fetches spread across different relays.
    #[must_use]
    pub fn working_set(&self) -> WorkingSet {
        let mut proxies: VecDeque<ProxyDescriptor> = self.proxies.iter().cloned().collect();
        if let Some(start) = self.advance() {
            proxies.rotate_left(start);
        }
        WorkingSet { proxies }
    }

    fn advance(&self) -> Option<usize> {
        if self.proxies.is_empty() {
            return None;
        }
        Some(self.cursor.fetch_add(1, Ordering::Relaxed) % self.proxies.len())
    }
}

/// Proxies still eligible within a single fetch.
///
/// Removing a proxy here never affects the pool or other in-flight fetches.
#[derive(Debug, Clone)]
pub struct WorkingSet {
    proxies: VecDeque<ProxyDescriptor>,
}

impl WorkingSet {
    /// Next surviving proxy, cycling through the survivors.
    pub fn next(&mut self) -> Option<ProxyDescriptor> {
        let proxy = self.proxies.pop_front()?;
        self.proxies.push_back(proxy.clone());
        Some(proxy)
    }

    /// Drops `proxy` for the rest of this fetch.
    pub fn remove(&mut self, proxy: &ProxyDescriptor) {
        self.proxies.retain(|p| p != proxy);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}
