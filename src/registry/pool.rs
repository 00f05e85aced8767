//! The shared dispatch pool.
//!
//! Interfaces of the same generic shape (lists, iterators, completion handlers, ...) all use one
//! dispatch table per shape. The tables come from a [`SharedDispatchProvider`] and are fetched
//! once, on first use, into a fixed array indexed by [`SharedShape::slot`].

use std::{collections::HashMap, fmt, sync::Arc, sync::OnceLock};

use strum::{EnumCount, IntoEnumIterator};

use crate::interop::dispatch::{DispatchTableRef, SharedShape};

/// Source of the shared dispatch tables.
pub trait SharedDispatchProvider: Send + Sync {
    /// The table for `shape`, or `None` if the shape is unavailable in this configuration
    fn table(&self, shape: SharedShape) -> Option<DispatchTableRef>;
}

/// Provides no shared tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSharedDispatch;

impl SharedDispatchProvider for NoSharedDispatch {
    fn table(&self, _shape: SharedShape) -> Option<DispatchTableRef> {
        None
    }
}

/// Provides a fixed set of tables.
#[derive(Clone, Debug, Default)]
pub struct StaticDispatchProvider {
    tables: HashMap<SharedShape, DispatchTableRef>,
}

impl StaticDispatchProvider {
    /// Create a provider without tables
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide `table` for `shape`
    #[must_use]
    pub fn with(mut self, shape: SharedShape, table: DispatchTableRef) -> Self {
        self.tables.insert(shape, table);
        self
    }
}

impl SharedDispatchProvider for StaticDispatchProvider {
    fn table(&self, shape: SharedShape) -> Option<DispatchTableRef> {
        self.tables.get(&shape).cloned()
    }
}

/// The lazily populated pool of shared dispatch tables.
pub struct SharedDispatchPool {
    provider: Arc<dyn SharedDispatchProvider>,
    slots: OnceLock<[Option<DispatchTableRef>; SharedShape::COUNT]>,
}

impl SharedDispatchPool {
    /// Create a pool filled from `provider` on first use
    pub fn new(provider: Arc<dyn SharedDispatchProvider>) -> Self {
        SharedDispatchPool {
            provider,
            slots: OnceLock::new(),
        }
    }

    /// The shared table for `shape`.
    ///
    /// Every call for the same shape returns the same table.
    #[must_use]
    pub fn get(&self, shape: SharedShape) -> Option<DispatchTableRef> {
        self.slots()[shape.slot()].clone()
    }

    /// Number of shapes with an available table
    #[must_use]
    pub fn available(&self) -> usize {
        self.slots().iter().flatten().count()
    }

    fn slots(&self) -> &[Option<DispatchTableRef>; SharedShape::COUNT] {
        self.slots.get_or_init(|| {
            let mut slots: [Option<DispatchTableRef>; SharedShape::COUNT] = Default::default();
            for shape in SharedShape::iter() {
                slots[shape.slot()] = self.provider.table(shape);
                if slots[shape.slot()].is_none() {
                    log::warn!(
                        "shared dispatch slot {} ({:?}) is unavailable",
                        shape.slot(),
                        shape
                    );
                }
            }

            slots
        })
    }
}

impl fmt::Debug for SharedDispatchPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDispatchPool")
            .field("initialized", &self.slots.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        sync::Barrier,
        thread,
    };

    use super::*;
    use crate::interop::dispatch::DispatchTable;

    struct CountingProvider(AtomicUsize);

    impl SharedDispatchProvider for CountingProvider {
        fn table(&self, shape: SharedShape) -> Option<DispatchTableRef> {
            self.0.fetch_add(1, Ordering::SeqCst);
            (shape != SharedShape::AsyncCompletionHandler)
                .then(|| Arc::new(DispatchTable::new(format!("{shape:?}"), vec![shape.slot()])))
        }
    }

    #[test]
    fn pool_is_filled_once() {
        let provider = Arc::new(CountingProvider(AtomicUsize::new(0)));
        let pool = SharedDispatchPool::new(provider.clone());

        let first = pool.get(SharedShape::Iterator).unwrap();
        let second = pool.get(SharedShape::Iterator).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "Iterator");
        assert!(pool.get(SharedShape::AsyncCompletionHandler).is_none());
        assert_eq!(pool.available(), SharedShape::COUNT - 1);
        assert_eq!(provider.0.load(Ordering::SeqCst), SharedShape::COUNT);
    }

    #[test]
    fn concurrent_first_use_fills_once() {
        const THREADS: usize = 8;

        let provider = Arc::new(CountingProvider(AtomicUsize::new(0)));
        let pool = SharedDispatchPool::new(provider.clone());
        let start = Barrier::new(THREADS);

        let tables: Vec<DispatchTableRef> = thread::scope(|scope| {
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        start.wait();
                        pool.get(SharedShape::List).unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(provider.0.load(Ordering::SeqCst), SharedShape::COUNT);
        assert!(tables.iter().all(|table| Arc::ptr_eq(table, &tables[0])));
        assert_eq!(tables[0].name(), "List");
    }

    #[test]
    fn static_provider() {
        let table = Arc::new(DispatchTable::new("IVector", vec![1, 2, 3]));
        let provider = StaticDispatchProvider::new().with(SharedShape::List, table.clone());

        let pool = SharedDispatchPool::new(Arc::new(provider));
        assert!(Arc::ptr_eq(&pool.get(SharedShape::List).unwrap(), &table));
        assert_eq!(pool.available(), 1);

        let empty = SharedDispatchPool::new(Arc::new(NoSharedDispatch));
        assert_eq!(empty.available(), 0);
    }
}
