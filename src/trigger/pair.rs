use std::hash::{Hash, Hasher};

/// Two distinct values where the order doesn't matter for equality or hashing.
///
/// `UnorderedPair::new(a, b) == UnorderedPair::new(b, a)`, and both hash the same,
/// so a pair found from either side of a scan lands in the same set entry.
/// The construction order is still remembered in [`first`][Self::first]
/// and [`second`][Self::second].
#[derive(Clone, Copy, Debug)]
pub struct UnorderedPair<T> {
    first: T,
    second: T,
}

impl<T: PartialEq> UnorderedPair<T> {
    /// Create a pair, or `None` if both values are the same.
    #[inline]
    pub fn new(first: T, second: T) -> Option<Self> {
        (first != second).then_some(Self { first, second })
    }

    #[inline]
    pub fn contains(&self, val: &T) -> bool {
        self.first == *val || self.second == *val
    }
}

impl<T: Copy + PartialEq> UnorderedPair<T> {
    #[inline]
    pub fn first(&self) -> T {
        self.first
    }

    #[inline]
    pub fn second(&self) -> T {
        self.second
    }

    /// Get the member that isn't `val`, if `val` is in the pair.
    #[inline]
    pub fn other(&self, val: T) -> Option<T> {
        if self.first == val {
            Some(self.second)
        } else if self.second == val {
            Some(self.first)
        } else {
            None
        }
    }
}

impl<T: PartialEq> PartialEq for UnorderedPair<T> {
    fn eq(&self, other: &Self) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }
}

impl<T: Eq> Eq for UnorderedPair<T> {}

impl<T: Hash + Ord> Hash for UnorderedPair<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (lo, hi) = if self.first <= self.second {
            (&self.first, &self.second)
        } else {
            (&self.second, &self.first)
        };
        lo.hash(state);
        hi.hash(state);
    }
}
