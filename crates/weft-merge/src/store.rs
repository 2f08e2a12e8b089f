//! Store-backed recursive merging.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use weft_store::{StoreResult, ValueStore};
use weft_types::{Key, Payload, Value};

use crate::algebra::merge;

/// Merges values by recursing through a value store.
///
/// Divergent child keys are resolved by loading both child values, merging
/// them (recursively, through this same machinery), and writing the merged
/// child back to the store. This is the resolver a synchronizing client
/// actually wants: the whole subtree under two diverged heads collapses
/// into one.
pub struct StoreMerger<'a> {
    store: &'a dyn ValueStore,
}

impl<'a> StoreMerger<'a> {
    pub fn new(store: &'a dyn ValueStore) -> Self {
        Self { store }
    }

    /// Merge two values through the store.
    ///
    /// `Ok(None)` is a genuine conflict (or a child missing from the
    /// store); errors are storage failures.
    ///
    /// Boxed so the mutual recursion with `merge_keys` (each calls the
    /// other through a type-erased future) can be proven `Send`.
    pub fn merge_values<'b>(
        &'b self,
        a: &'b Value,
        b: &'b Value,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Value>>> + Send + 'b>> {
        Box::pin(async move {
            // Resolve every divergent child pair up front; the pure merge then
            // runs with a synchronous map lookup as its resolver.
            let mut resolved: HashMap<(Key, Key), Key> = HashMap::new();
            for (left, right) in divergent_children(a, b) {
                match self.merge_keys(left, right).await? {
                    Some(merged) => {
                        resolved.insert((left, right), merged);
                    }
                    None => return Ok(None),
                }
            }

            Ok(merge(
                &mut |x: &Key, y: &Key| resolved.get(&(*x, *y)).copied(),
                a,
                b,
            ))
        })
    }

    /// Merge the values stored under two keys, writing the result back.
    ///
    /// Returns the merged value's key, or `Ok(None)` on conflict or when
    /// either value is absent from the store.
    pub fn merge_keys<'b>(
        &'b self,
        a: Key,
        b: Key,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Key>>> + Send + 'b>> {
        Box::pin(async move {
            if a == b {
                return Ok(Some(a));
            }
            let (Some(left), Some(right)) =
                (self.store.read(&a).await?, self.store.read(&b).await?)
            else {
                return Ok(None);
            };
            let merged = self.merge_values(&left, &right).await?;
            match merged {
                Some(value) => Ok(Some(self.store.write(&value).await?)),
                None => Ok(None),
            }
        })
    }
}

/// The `(left, right)` child-key pairs that differ under the same label.
fn divergent_children(a: &Value, b: &Value) -> Vec<(Key, Key)> {
    let (Payload::Node(left), Payload::Node(right)) = (a.payload(), b.payload()) else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    for (label, left_key) in &left.entries {
        if let Some(right_key) = right.get(label) {
            if *left_key != right_key {
                pairs.push((*left_key, right_key));
            }
        }
    }
    pairs
}
