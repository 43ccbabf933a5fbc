use crate::config::{Config, DEFAULT_MAX_HEIGHT};
use crate::error::{Error, Result};
use crate::skiplist::height::HeightSource;
use crate::skiplist::list::{IntoIter, Iter, SkipList};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::iter::FromIterator;

/// The ordering a `SkipListSet` sorts its elements by.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Comparator {
    /// The element type's own `Ord` implementation.
    Natural,
}

/// An ordered set implemented by a skiplist.
///
/// A skiplist is a probabilistic data structure that allows for binary search tree operations by
/// maintaining a linked hierarchy of subsequences. The first subsequence is a sorted linked list
/// of all the elements that it contains. Each successive subsequence contains approximately half
/// the elements of the previous subsequence. Using the sparser subsequences, elements can be
/// skipped and searching, insertion, and deletion of elements can be done in expected logarithmic
/// time.
///
/// Tower heights are only drawn when an element is inserted, so after heavy churn the levels can
/// drift from their expected shape. `rebalance` redraws every tower.
///
/// # Examples
/// ```
/// use skiplist_set::SkipListSet;
///
/// let mut set = SkipListSet::new();
/// set.insert(0);
/// set.insert(3);
///
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.first(), Some(&0));
/// assert_eq!(set.last(), Some(&3));
///
/// assert!(set.remove(&0));
/// assert!(!set.remove(&1));
/// ```
pub struct SkipListSet<T, R = StdRng>
where
    T: Ord,
    R: HeightSource,
{
    list: SkipList<T, R>,
}

impl<T> SkipListSet<T>
where
    T: Ord,
{
    /// Constructs a new, empty `SkipListSet<T>` with an entropy-seeded random source.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let set: SkipListSet<u32> = SkipListSet::new();
    /// ```
    pub fn new() -> Self {
        SkipListSet {
            list: SkipList::new(DEFAULT_MAX_HEIGHT, StdRng::from_entropy()),
        }
    }

    /// Constructs a new, empty `SkipListSet<T>` from a `Config`. Returns an error if the
    /// configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::{Config, Error, SkipListSet};
    ///
    /// let set: SkipListSet<u32> = SkipListSet::with_config(Config::new().seed(1)).unwrap();
    /// assert!(set.is_empty());
    ///
    /// let ret = SkipListSet::<u32>::with_config(Config::new().max_height(0));
    /// assert_eq!(ret.err(), Some(Error::InvalidMaxHeight(0)));
    /// ```
    pub fn with_config(config: Config) -> Result<Self> {
        let source = match config.get_seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_config_and_source(config, source)
    }
}

impl<T, R> SkipListSet<T, R>
where
    T: Ord,
    R: HeightSource,
{
    /// Constructs a new, empty `SkipListSet<T, R>` that draws tower heights from `source`.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    /// use skiplist_set::skiplist::Scripted;
    ///
    /// let mut set = SkipListSet::with_source(Scripted::towers(vec![1]));
    /// set.insert(1);
    /// assert_eq!(set.height(), 1);
    /// ```
    pub fn with_source(source: R) -> Self {
        SkipListSet {
            list: SkipList::new(DEFAULT_MAX_HEIGHT, source),
        }
    }

    /// Constructs a new, empty `SkipListSet<T, R>` from a `Config` and an explicit `source`. The
    /// seed of the configuration is ignored.
    pub fn with_config_and_source(config: Config, source: R) -> Result<Self> {
        config.validate()?;
        Ok(SkipListSet {
            list: SkipList::new(config.get_max_height(), source),
        })
    }

    /// Inserts an element into the set. Returns `false` and leaves the set untouched if an equal
    /// element already exists.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set = SkipListSet::new();
    /// assert!(set.insert(1));
    /// assert!(set.contains(&1));
    /// assert!(!set.insert(1));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, element: T) -> bool {
        self.list.insert(element)
    }

    /// Removes an element from the set. Returns `true` if the element was present.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set = SkipListSet::new();
    /// set.insert(1);
    /// assert!(set.remove(&1));
    /// assert!(!set.remove(&1));
    /// ```
    pub fn remove(&mut self, key: &T) -> bool {
        self.list.remove(key)
    }

    /// Checks if an element exists in the set.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set = SkipListSet::new();
    /// set.insert(1);
    /// assert!(!set.contains(&0));
    /// assert!(set.contains(&1));
    /// ```
    pub fn contains(&self, key: &T) -> bool {
        self.list.contains(key)
    }

    /// Returns `true` if every element of `keys` exists in the set.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let set: SkipListSet<u32> = vec![1, 2, 3].into_iter().collect();
    /// assert!(set.contains_all(&[1, 3]));
    /// assert!(!set.contains_all(&[1, 4]));
    /// ```
    pub fn contains_all<'a, I>(&self, keys: I) -> bool
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        keys.into_iter().all(|key| self.contains(key))
    }

    /// Inserts every element of `elements`. Always returns `true`.
    pub fn insert_all<I>(&mut self, elements: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        for element in elements {
            self.insert(element);
        }
        true
    }

    /// Removes every element of `keys` that exists in the set. Always returns `true`.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set: SkipListSet<u32> = vec![1, 2, 3].into_iter().collect();
    /// assert!(set.remove_all(&[1, 3, 5]));
    /// assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&2]);
    /// ```
    pub fn remove_all<'a, I>(&mut self, keys: I) -> bool
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for key in keys {
            self.remove(key);
        }
        true
    }

    /// Clears the set and rebuilds it from `elements`. Elements of `elements` that were not in the
    /// set beforehand end up in it as well. Always returns `false`.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set: SkipListSet<u32> = vec![1, 2, 3].into_iter().collect();
    /// assert!(!set.retain_all(vec![2, 3, 4]));
    /// assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&2, &3, &4]);
    /// ```
    pub fn retain_all<I>(&mut self, elements: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.insert_all(elements);
        false
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set = SkipListSet::new();
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let set: SkipListSet<u32> = SkipListSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.list.len() == 0
    }

    /// Clears the set, removing all elements and restoring the initial height cap.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set = SkipListSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// set.clear();
    /// assert!(set.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Returns the minimum element of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set = SkipListSet::new();
    /// set.insert(1);
    /// set.insert(3);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    pub fn first(&self) -> Option<&T> {
        self.list.first()
    }

    /// Returns the maximum element of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set = SkipListSet::new();
    /// set.insert(1);
    /// set.insert(3);
    /// assert_eq!(set.last(), Some(&3));
    /// ```
    pub fn last(&self) -> Option<&T> {
        self.list.last()
    }

    /// Redraws the height of every tower and rebuilds all levels above the bottom one. The
    /// elements and their order are unchanged.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set: SkipListSet<u32> = (0..100).collect();
    /// set.rebalance();
    /// assert_eq!(set.len(), 100);
    /// assert!(set.iter().cloned().eq(0..100));
    /// ```
    pub fn rebalance(&mut self) {
        self.list.rebalance();
    }

    /// Returns the index of the top level. An empty set has a height of 0.
    pub fn height(&self) -> usize {
        self.list.height()
    }

    /// Returns the current cap on tower heights.
    pub fn max_height(&self) -> usize {
        self.list.max_height()
    }

    /// Returns the ordering used by the set, which is always the natural ordering of `T`.
    pub fn comparator(&self) -> Comparator {
        Comparator::Natural
    }

    /// Range views are not supported; always returns `Error::Unsupported`.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::{Error, SkipListSet};
    ///
    /// let set: SkipListSet<u32> = (0..10).collect();
    /// assert_eq!(set.sub_set(&2, &5).err(), Some(Error::Unsupported("sub_set")));
    /// ```
    pub fn sub_set(&self, _from: &T, _to: &T) -> Result<Self> {
        Err(Error::Unsupported("sub_set"))
    }

    /// Range views are not supported; always returns `Error::Unsupported`.
    pub fn head_set(&self, _to: &T) -> Result<Self> {
        Err(Error::Unsupported("head_set"))
    }

    /// Range views are not supported; always returns `Error::Unsupported`.
    pub fn tail_set(&self, _from: &T) -> Result<Self> {
        Err(Error::Unsupported("tail_set"))
    }

    /// Returns an iterator over the set. The iterator will yield elements in ascending order.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let mut set = SkipListSet::new();
    /// set.insert(1);
    /// set.insert(3);
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        self.list.iter()
    }

    /// Returns every element in ascending order.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::SkipListSet;
    ///
    /// let set: SkipListSet<u32> = vec![3, 1, 2].into_iter().collect();
    /// assert_eq!(&*set.to_array(), &[1, 2, 3]);
    /// ```
    pub fn to_array(&self) -> Box<[T]>
    where
        T: Clone,
    {
        self.to_vec().into_boxed_slice()
    }

    /// Returns every element in ascending order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T> Default for SkipListSet<T>
where
    T: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for SkipListSet<T>
where
    T: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = SkipListSet::new();
        set.insert_all(iter);
        set
    }
}

impl<T, R> Extend<T> for SkipListSet<T, R>
where
    T: Ord,
    R: HeightSource,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.insert_all(iter);
    }
}

impl<T, R> IntoIterator for SkipListSet<T, R>
where
    T: Ord,
    R: HeightSource,
{
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl<'a, T, R> IntoIterator for &'a SkipListSet<T, R>
where
    T: 'a + Ord,
    R: HeightSource,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, R> PartialEq for SkipListSet<T, R>
where
    T: Ord,
    R: HeightSource,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, R> Eq for SkipListSet<T, R>
where
    T: Ord,
    R: HeightSource,
{
}

impl<T, R> fmt::Debug for SkipListSet<T, R>
where
    T: Ord + fmt::Debug,
    R: HeightSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
