use std::sync::Arc;

use crate::foundation::error::{MetroError, MetroResult};

/// Immutable fixed-order rotation over a non-empty list of language variants.
///
/// The backing list is shared: [`CircularSequence::next`] and [`CircularSequence::prev`] return a
/// new sequence pointing at a different head without copying the variants.
#[derive(Debug, PartialEq)]
pub struct CircularSequence<T> {
    items: Arc<[T]>,
    head: usize,
}

impl<T> Clone for CircularSequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            head: self.head,
        }
    }
}

impl<T> CircularSequence<T> {
    /// Build a sequence with its head on the first item.
    pub fn new(items: Vec<T>) -> MetroResult<Self> {
        if items.is_empty() {
            return Err(MetroError::config(
                "a circular sequence needs at least one translation",
            ));
        }
        Ok(Self {
            items: items.into(),
            head: 0,
        })
    }

    /// Return a sequence over the same items with its head moved to `head`.
    pub fn with_head(&self, head: usize) -> MetroResult<Self> {
        if head >= self.items.len() {
            return Err(MetroError::config(format!(
                "head {head} out of range for sequence of length {}",
                self.items.len()
            )));
        }
        Ok(Self {
            items: Arc::clone(&self.items),
            head,
        })
    }

    /// Number of variants (always >= 1).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the element under the head.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Element under the head.
    pub fn current(&self) -> &T {
        &self.items[self.head]
    }

    /// Element in storage position 0, regardless of the head.
    pub fn first(&self) -> &T {
        &self.items[0]
    }

    /// Items in storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Sequence with the head advanced by one, wrapping at the end.
    pub fn next(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            head: (self.head + 1) % self.items.len(),
        }
    }

    /// Sequence with the head moved back by one, wrapping at the start.
    pub fn prev(&self) -> Self {
        let len = self.items.len();
        Self {
            items: Arc::clone(&self.items),
            head: (self.head + len - 1) % len,
        }
    }

    /// Items read from the head, wrapping once, with the head element repeated at the end.
    ///
    /// For `[A, B, C]` with head 0 this yields `A, B, C, A`.
    pub fn iter_closed(&self) -> impl Iterator<Item = &T> + '_ {
        let len = self.items.len();
        (0..=len).map(move |i| &self.items[(self.head + i) % len])
    }

    /// Consecutive `(current, next)` pairs of [`CircularSequence::iter_closed`].
    ///
    /// Yields exactly `len()` pairs; the last one closes the cycle back to the head element.
    /// A single-item sequence yields one `(x, x)` pair.
    pub fn ordered_pairs(&self) -> OrderedPairs<'_, T> {
        OrderedPairs { seq: self, step: 0 }
    }

    /// The `index`-th pair of [`CircularSequence::ordered_pairs`].
    pub fn pair(&self, index: usize) -> Option<(&T, &T)> {
        self.ordered_pairs().nth(index)
    }
}

/// Iterator returned by [`CircularSequence::ordered_pairs`].
#[derive(Clone, Debug)]
pub struct OrderedPairs<'a, T> {
    seq: &'a CircularSequence<T>,
    step: usize,
}

impl<'a, T> Iterator for OrderedPairs<'a, T> {
    type Item = (&'a T, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.seq.items.len();
        if self.step >= len {
            return None;
        }
        let a = &self.seq.items[(self.seq.head + self.step) % len];
        let b = &self.seq.items[(self.seq.head + self.step + 1) % len];
        self.step += 1;
        Some((a, b))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.seq.items.len().saturating_sub(self.step);
        (rest, Some(rest))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.step = self.step.saturating_add(n);
        self.next()
    }
}

impl<T> ExactSizeIterator for OrderedPairs<'_, T> {}

impl<T: serde::Serialize> serde::Serialize for CircularSequence<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for CircularSequence<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::new(items).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/circular.rs"]
mod tests;
