// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subscriber registry.

use core::fmt;
use std::panic::{self, AssertUnwindSafe};

use hashbrown::HashMap;

use crate::sample::Sample;

/// Handle returned by [`MotionProvider::subscribe`](crate::provider::MotionProvider::subscribe).
///
/// Ids are never reused within one provider.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

/// A registered sample callback.
pub type Observer = Box<dyn FnMut(&Sample) + Send + 'static>;

/// Unordered set of observers keyed by [`SubscriptionId`].
///
/// Each observer sees samples in the order they are published; no order is
/// defined between observers.
#[derive(Default)]
pub(crate) struct Registry {
    observers: HashMap<SubscriptionId, Observer>,
    next_id: u64,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.observers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Registry {
    pub(crate) fn insert(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, observer);
        id
    }

    /// Returns whether `id` was registered. Unknown ids are ignored.
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Calls every observer with `sample`.
    ///
    /// An observer that panics is removed and its id returned; the others
    /// still see the sample.
    pub(crate) fn deliver(&mut self, sample: &Sample) -> Vec<SubscriptionId> {
        let mut panicked = Vec::new();
        self.observers.retain(|id, observer| {
            let ok = panic::catch_unwind(AssertUnwindSafe(|| observer(sample))).is_ok();
            if !ok {
                panicked.push(*id);
            }
            ok
        });
        panicked
    }
}
