// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Membership cache for resources a caller has already fetched once.
//!
//! Grid hosts often show a loading placeholder per item until its resource
//! (typically an image) arrives. After a row is unmounted and mounted again the
//! resource is already cached downstream, so the placeholder only causes a
//! flash. Recording the resource key here lets the item renderer skip it.
//!
//! The cache only grows: there is no removal, capacity bound, or expiry.
//! [`SeenSet`] is a plain owned set. With the `std` feature,
//! [`SharedSeenSet`] wraps one behind a mutex and [`global`] returns the
//! process-wide instance, which lives until the process exits. Tests and
//! callers that need isolation construct their own [`SharedSeenSet`] instead
//! of using the global one.

use core::borrow::Borrow;
use core::hash::Hash;

use hashbrown::HashSet;

/// An insert-only set of keys.
#[derive(Debug, Clone)]
pub struct SeenSet<K> {
    keys: HashSet<K>,
}

impl<K> Default for SeenSet<K> {
    fn default() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }
}

impl<K: Hash + Eq> SeenSet<K> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `key` has been marked as seen.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keys.contains(key)
    }

    /// Marks `key` as seen. Marking a key twice is a no-op.
    ///
    /// Returns `true` if the key was not already present.
    pub fn mark_seen(&mut self, key: K) -> bool {
        self.keys.insert(key)
    }

    /// Number of distinct keys seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no key has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(feature = "std")]
mod shared {
    use core::borrow::Borrow;
    use core::hash::Hash;
    use std::string::String;
    use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

    use super::SeenSet;

    /// A [`SeenSet`] that can be shared across threads.
    ///
    /// A poisoned lock is recovered: inserts are idempotent, so a panic while
    /// holding the lock cannot leave the set inconsistent.
    #[derive(Debug)]
    pub struct SharedSeenSet<K> {
        inner: Mutex<SeenSet<K>>,
    }

    impl<K> Default for SharedSeenSet<K> {
        fn default() -> Self {
            Self {
                inner: Mutex::new(SeenSet::default()),
            }
        }
    }

    impl<K: Hash + Eq> SharedSeenSet<K> {
        /// Creates an empty shared set.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        fn lock(&self) -> MutexGuard<'_, SeenSet<K>> {
            self.inner.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Returns `true` if `key` has been marked as seen.
        #[must_use]
        pub fn contains<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Hash + Eq + ?Sized,
        {
            self.lock().contains(key)
        }

        /// Marks `key` as seen. Returns `true` if the key was not already present.
        pub fn mark_seen(&self, key: K) -> bool {
            self.lock().mark_seen(key)
        }

        /// Number of distinct keys seen.
        #[must_use]
        pub fn len(&self) -> usize {
            self.lock().len()
        }

        /// Returns `true` if no key has been seen.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.lock().is_empty()
        }
    }

    /// The process-wide cache of seen resource keys.
    ///
    /// Created on first use and never cleared.
    pub fn global() -> &'static SharedSeenSet<String> {
        static GLOBAL: OnceLock<SharedSeenSet<String>> = OnceLock::new();
        GLOBAL.get_or_init(SharedSeenSet::new)
    }
}

#[cfg(feature = "std")]
pub use shared::{SharedSeenSet, global};

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use super::SeenSet;

    #[test]
    fn keys_are_unseen_until_marked() {
        let mut seen = SeenSet::<String>::new();
        assert!(seen.is_empty());
        assert!(!seen.contains("https://cdn.example/a.jpg"));

        assert!(seen.mark_seen("https://cdn.example/a.jpg".to_string()));
        assert!(seen.contains("https://cdn.example/a.jpg"));

        assert!(!seen.mark_seen("https://cdn.example/a.jpg".to_string()));
        assert!(seen.contains("https://cdn.example/a.jpg"));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn duplicates_and_order_do_not_change_the_count() {
        let mut forward = SeenSet::new();
        let mut backward = SeenSet::new();
        let keys = [3_u32, 1, 4, 1, 5, 9, 2, 6, 5, 3];
        for key in keys {
            forward.mark_seen(key);
        }
        for key in keys.iter().rev() {
            backward.mark_seen(*key);
        }
        assert_eq!(forward.len(), 7);
        assert_eq!(backward.len(), 7);
    }

    #[cfg(feature = "std")]
    #[test]
    fn shared_sets_are_isolated_from_the_global_one() {
        use std::sync::Arc;
        use std::thread;

        use super::{SharedSeenSet, global};

        let local = Arc::new(SharedSeenSet::<String>::new());
        let handles: alloc::vec::Vec<_> = (0..4)
            .map(|t| {
                let local = Arc::clone(&local);
                thread::spawn(move || {
                    for i in 0..50 {
                        local.mark_seen(alloc::format!("thumb-{}", (i + t) % 60));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(local.len(), 53);
        assert!(local.contains("thumb-52"));

        let key = "understory-virtual-grid-test-key";
        assert!(!local.contains(key));
        global().mark_seen(key.to_string());
        assert!(global().contains(key));
        assert!(!local.contains(key));
        assert!(core::ptr::eq(global(), global()));
    }
}
