use crate::arena::{Entry, TypedArena};
use crate::error::{Error, Result};
use crate::skiplist::height::{HeightGenerator, HeightSource};
use crate::skiplist::node::{Frame, Node, Payload};
use std::vec;
use tracing::{debug, instrument, trace};

/// The level engine behind `SkipListSet`.
///
/// Every level is a doubly linked list bounded by a `Frame` of sentinels, and levels are stacked
/// through `above`/`below` links. Level 0 holds every element in ascending order; each level above
/// holds a subset of the level below it. The top level always contains at least one element
/// unless the list is empty, in which case only the level-0 frame exists.
pub struct SkipList<T, R>
where
    T: Ord,
{
    nodes: TypedArena<Node<T>>,
    top: Frame,
    bottom: Frame,
    height: usize,
    len: usize,
    heights: HeightGenerator<R>,
}

impl<T, R> SkipList<T, R>
where
    T: Ord,
    R: HeightSource,
{
    pub fn new(max_height: usize, source: R) -> Self {
        let mut nodes = TypedArena::new();
        let bottom = Frame::allocate(&mut nodes);
        SkipList {
            nodes,
            top: bottom,
            bottom,
            height: 0,
            len: 0,
            heights: HeightGenerator::new(max_height, source),
        }
    }

    fn next_of(&self, entry: Entry) -> Entry {
        self.nodes[entry].next.expect("Error: node has no successor.")
    }

    fn prev_of(&self, entry: Entry) -> Entry {
        self.nodes[entry].prev.expect("Error: node has no predecessor.")
    }

    fn key(&self, entry: Entry) -> Option<&T> {
        match self.nodes[entry].payload {
            Payload::Sentinel => None,
            Payload::Element(ref value) => Some(value),
            Payload::Copy(base) => match self.nodes[base].payload {
                Payload::Element(ref value) => Some(value),
                _ => panic!("Error: tower copy does not point at an element."),
            },
        }
    }

    fn is_match(&self, entry: Entry, target: &T) -> bool {
        self.key(entry).map_or(false, |key| key == target)
    }

    /// Returns the level-0 node holding `target`, or the level-0 node after which `target` would
    /// be inserted.
    fn search(&self, target: &T) -> Entry {
        let mut curr = self.top.head;
        loop {
            while let Some(next) = self.nodes[curr].next {
                match self.key(next) {
                    Some(key) if key <= target => curr = next,
                    _ => break,
                }
            }
            match self.nodes[curr].below {
                Some(below) => curr = below,
                None => return curr,
            }
        }
    }

    fn splice_after(&mut self, left: Entry, entry: Entry) {
        let right = self.next_of(left);
        self.nodes[entry].prev = Some(left);
        self.nodes[entry].next = Some(right);
        self.nodes[right].prev = Some(entry);
        self.nodes[left].next = Some(entry);
    }

    fn unlink(&mut self, entry: Entry) {
        let left = self.prev_of(entry);
        let right = self.next_of(entry);
        self.nodes[left].next = Some(right);
        self.nodes[right].prev = Some(left);
    }

    fn push_level(&mut self) {
        let frame = Frame::allocate(&mut self.nodes);
        self.nodes[frame.head].below = Some(self.top.head);
        self.nodes[frame.tail].below = Some(self.top.tail);
        self.nodes[self.top.head].above = Some(frame.head);
        self.nodes[self.top.tail].above = Some(frame.tail);
        self.top = frame;
        self.height += 1;
        trace!(height = self.height, "pushed level");
    }

    /// Drops the top frame. The level must not contain any nodes.
    fn pop_level(&mut self) {
        let old = self.top;
        self.top = Frame {
            head: self.nodes[old.head].below.expect("Error: popped the bottom level."),
            tail: self.nodes[old.tail].below.expect("Error: popped the bottom level."),
        };
        self.nodes[self.top.head].above = None;
        self.nodes[self.top.tail].above = None;
        self.nodes.free(old.head);
        self.nodes.free(old.tail);
        self.height -= 1;
        trace!(height = self.height, "popped level");
    }

    /// Stacks `height` copies of the level-0 node `base` above it, growing the list first if it is
    /// not tall enough.
    fn build_tower(&mut self, base: Entry, height: usize) {
        while self.height < height {
            self.push_level();
        }

        let mut below = base;
        for _ in 0..height {
            let mut left = self.prev_of(below);
            let upper_left = loop {
                match self.nodes[left].above {
                    Some(above) => break above,
                    None => left = self.prev_of(left),
                }
            };
            let entry = self.nodes.allocate(Node::copy_of(base));
            self.splice_after(upper_left, entry);
            self.nodes[below].above = Some(entry);
            self.nodes[entry].below = Some(below);
            below = entry;
        }
    }

    pub fn contains(&self, target: &T) -> bool {
        self.is_match(self.search(target), target)
    }

    pub fn insert(&mut self, value: T) -> bool {
        let prev = self.search(&value);
        if self.is_match(prev, &value) {
            return false;
        }

        let base = self.nodes.allocate(Node::element(value));
        self.splice_after(prev, base);
        let height = self.heights.generate();
        self.build_tower(base, height);

        self.len += 1;
        self.heights.grow(self.len);
        true
    }

    pub fn remove(&mut self, target: &T) -> bool {
        let base = self.search(target);
        if !self.is_match(base, target) {
            return false;
        }

        // copies only refer to `base`, so the whole tower can go bottom-up
        let mut curr = Some(base);
        while let Some(entry) = curr {
            curr = self.nodes[entry].above;
            self.unlink(entry);
            self.nodes.free(entry);
        }

        self.len -= 1;
        self.heights.shrink(self.len);
        while self.height > 0 && self.top.is_empty(&self.nodes) {
            self.pop_level();
        }
        true
    }

    /// Discards every level above level 0 and rebuilds them with freshly drawn tower heights.
    #[instrument(level = "debug", skip(self), fields(len = self.len))]
    pub fn rebalance(&mut self) {
        while self.height > 0 {
            let frame = self.top;
            let mut curr = self.next_of(frame.head);
            while curr != frame.tail {
                let next = self.next_of(curr);
                if let Some(below) = self.nodes[curr].below {
                    self.nodes[below].above = None;
                }
                self.nodes.free(curr);
                curr = next;
            }
            self.nodes[frame.head].next = Some(frame.tail);
            self.nodes[frame.tail].prev = Some(frame.head);
            self.pop_level();
        }

        let mut curr = self.next_of(self.bottom.head);
        while curr != self.bottom.tail {
            let height = self.heights.generate();
            self.build_tower(curr, height);
            curr = self.next_of(curr);
        }
        debug!(height = self.height, "rebuilt levels");
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.bottom = Frame::allocate(&mut self.nodes);
        self.top = self.bottom;
        self.height = 0;
        self.len = 0;
        self.heights.reset();
    }

    pub fn first(&self) -> Option<&T> {
        self.key(self.next_of(self.bottom.head))
    }

    pub fn last(&self) -> Option<&T> {
        self.key(self.prev_of(self.bottom.tail))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_height(&self) -> usize {
        self.heights.max_height()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            current: self.next_of(self.bottom.head),
            remaining: self.len,
        }
    }
}

impl<T, R> IntoIterator for SkipList<T, R>
where
    T: Ord,
    R: HeightSource,
{
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Moves every element out of level 0 in ascending order.
    fn into_iter(mut self) -> Self::IntoIter {
        let mut values = Vec::with_capacity(self.len);
        let mut curr = self.next_of(self.bottom.head);
        while curr != self.bottom.tail {
            let next = self.next_of(curr);
            if let Payload::Element(value) = self.nodes.free(curr).payload {
                values.push(value);
            }
            curr = next;
        }
        IntoIter {
            values: values.into_iter(),
        }
    }
}

/// An iterator for `SkipListSet<T>`.
///
/// This iterator walks level 0 of a set in ascending order and yields immutable references. It
/// cannot be restarted; call `iter` again for another pass.
pub struct Iter<'a, T> {
    nodes: &'a TypedArena<Node<T>>,
    current: Entry,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    /// Removing through the iterator is not supported and always fails without touching the set.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::{Error, SkipListSet};
    ///
    /// let mut set = SkipListSet::new();
    /// set.insert(1);
    ///
    /// let mut iterator = set.iter();
    /// iterator.next();
    /// assert_eq!(iterator.remove(), Err(Error::Unsupported("Iter::remove")));
    /// assert!(set.contains(&1));
    /// ```
    pub fn remove(&mut self) -> Result<()> {
        Err(Error::Unsupported("Iter::remove"))
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.current];
        match node.payload {
            Payload::Element(ref value) => {
                self.current = node.next.expect("Error: node has no successor.");
                self.remaining -= 1;
                Some(value)
            },
            _ => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

/// An owning iterator for `SkipListSet<T>`.
///
/// This iterator yields the elements of a set in ascending order.
pub struct IntoIter<T> {
    values: vec::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.values.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
    use super::SkipList;
    use crate::arena::Entry;
    use crate::skiplist::height::{HeightSource, Scripted};
    use crate::skiplist::node::Payload;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::collections::{BTreeSet, HashSet};

    impl<T, R> SkipList<T, R>
    where
        T: Ord + Clone,
        R: HeightSource,
    {
        fn level_frames(&self) -> Vec<(Entry, Entry)> {
            let mut frames = vec![(self.bottom.head, self.bottom.tail)];
            let (mut head, mut tail) = (self.bottom.head, self.bottom.tail);
            while let Some(above_head) = self.nodes[head].above {
                head = above_head;
                tail = self.nodes[tail].above.expect("tail frame ends early");
                frames.push((head, tail));
            }
            assert_eq!(self.nodes[tail].above, None);
            frames
        }

        fn level_entries(&self, level: usize) -> Vec<Entry> {
            let (head, tail) = self.level_frames()[level];
            let mut entries = Vec::new();
            let mut curr = self.next_of(head);
            while curr != tail {
                entries.push(curr);
                curr = self.next_of(curr);
            }
            entries
        }

        fn level_keys(&self, level: usize) -> Vec<T> {
            self.level_entries(level)
                .into_iter()
                .map(|entry| self.key(entry).cloned().unwrap())
                .collect()
        }

        fn tower_heights(&self) -> Vec<usize> {
            self.level_entries(0)
                .into_iter()
                .map(|base| {
                    let mut height = 0;
                    let mut curr = base;
                    while let Some(above) = self.nodes[curr].above {
                        height += 1;
                        curr = above;
                    }
                    height
                })
                .collect()
        }

        fn check_invariants(&self) {
            let frames = self.level_frames();
            assert_eq!(frames.len(), self.height + 1);
            assert_eq!(frames[0], (self.bottom.head, self.bottom.tail));
            assert_eq!(frames[self.height], (self.top.head, self.top.tail));
            if self.height > 0 {
                assert!(!self.top.is_empty(&self.nodes));
            }

            let mut previous_level: HashSet<Entry> = HashSet::new();
            let mut node_count = 0;
            for (level, &(head, tail)) in frames.iter().enumerate() {
                assert_eq!(self.nodes[head].prev, None);
                assert_eq!(self.nodes[tail].next, None);

                let entries = self.level_entries(level);
                let mut prev = head;
                for &entry in &entries {
                    assert_eq!(self.nodes[entry].prev, Some(prev));
                    assert_eq!(self.nodes[prev].next, Some(entry));
                    prev = entry;

                    match self.nodes[entry].payload {
                        Payload::Element(_) => assert_eq!(level, 0),
                        Payload::Copy(base) => {
                            assert!(level > 0);
                            let below = self.nodes[entry].below.unwrap();
                            assert!(previous_level.contains(&below));
                            assert_eq!(self.nodes[below].above, Some(entry));
                            assert!(self.key(below) == self.key(entry));
                            assert!(self.key(base) == self.key(entry));
                        },
                        Payload::Sentinel => panic!("sentinel inside a level"),
                    }
                }
                assert_eq!(self.nodes[tail].prev, Some(prev));

                let keys: Vec<&T> = entries.iter().map(|&entry| self.key(entry).unwrap()).collect();
                assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));

                node_count += entries.len();
                previous_level = entries.into_iter().collect();
            }

            assert_eq!(self.level_entries(0).len(), self.len);
            assert_eq!(self.iter().count(), self.len);
            let tower_nodes: usize = self.tower_heights().iter().sum();
            assert_eq!(node_count, self.len + tower_nodes);
            assert_eq!(self.nodes.len(), node_count + 2 * frames.len());
            if self.len > 0 {
                assert_eq!(self.tower_heights().into_iter().max(), Some(self.height));
            }
        }
    }

    fn scripted(heights: Vec<usize>) -> SkipList<u32, Scripted> {
        SkipList::new(16, Scripted::towers(heights))
    }

    #[test]
    fn test_empty() {
        let list: SkipList<u32, Scripted> = scripted(vec![]);
        assert_eq!(list.len(), 0);
        assert_eq!(list.height(), 0);
        assert_eq!(list.first(), None);
        assert_eq!(list.last(), None);
        assert!(!list.contains(&1));
        list.check_invariants();
    }

    #[test]
    fn test_insert_builds_exact_towers() {
        let mut list = scripted(vec![2, 0, 1]);
        assert!(list.insert(10));
        assert!(list.insert(20));
        assert!(list.insert(30));
        list.check_invariants();

        assert_eq!(list.height(), 2);
        assert_eq!(list.tower_heights(), vec![2, 0, 1]);
        assert_eq!(list.level_keys(0), vec![10, 20, 30]);
        assert_eq!(list.level_keys(1), vec![10, 30]);
        assert_eq!(list.level_keys(2), vec![10]);
    }

    #[test]
    fn test_insert_tower_splices_between_existing_towers() {
        let mut list = scripted(vec![1, 1, 1]);
        list.insert(10);
        list.insert(30);
        list.insert(20);
        list.check_invariants();

        assert_eq!(list.level_keys(1), vec![10, 20, 30]);
    }

    #[test]
    fn test_insert_duplicate() {
        let mut list = scripted(vec![1, 3]);
        assert!(list.insert(5));
        assert!(!list.insert(5));
        list.check_invariants();

        assert_eq!(list.len(), 1);
        assert_eq!(list.height(), 1);
        assert_eq!(list.tower_heights(), vec![1]);
    }

    #[test]
    fn test_remove_drops_empty_levels() {
        let mut list = scripted(vec![2, 0, 1]);
        list.insert(10);
        list.insert(20);
        list.insert(30);

        assert!(list.remove(&10));
        list.check_invariants();
        assert_eq!(list.height(), 1);
        assert_eq!(list.level_keys(1), vec![30]);

        assert!(list.remove(&30));
        list.check_invariants();
        assert_eq!(list.height(), 0);
        assert_eq!(list.level_keys(0), vec![20]);

        assert!(list.remove(&20));
        list.check_invariants();
        assert_eq!(list.first(), None);
    }

    #[test]
    fn test_remove_absent() {
        let mut list = scripted(vec![1, 0]);
        list.insert(10);
        list.insert(20);

        assert!(!list.remove(&15));
        assert!(!list.remove(&5));
        assert!(!list.remove(&25));
        list.check_invariants();
        assert_eq!(list.len(), 2);
        assert_eq!(list.tower_heights(), vec![1, 0]);
    }

    #[test]
    fn test_remove_releases_tower() {
        let mut list = scripted(vec![3, 3]);
        list.insert(1);
        let allocated = list.nodes.len();
        list.remove(&1);
        list.insert(1);
        assert_eq!(list.nodes.len(), allocated);
        list.check_invariants();
    }

    #[test]
    fn test_search_lands_on_equal_key() {
        let mut list = scripted(vec![1, 2, 0]);
        list.insert(1);
        list.insert(2);
        list.insert(3);

        assert!(list.is_match(list.search(&2), &2));
        assert_eq!(list.key(list.search(&0)), None);
        assert_eq!(list.key(list.search(&4)), Some(&3));
    }

    #[test]
    fn test_rebalance_rerolls_towers() {
        let heights = vec![0, 0, 0, 0, 3, 1, 0, 2];
        let mut list = scripted(heights);
        for key in 1..=4 {
            list.insert(key);
        }
        assert_eq!(list.height(), 0);

        list.rebalance();
        list.check_invariants();
        assert_eq!(list.tower_heights(), vec![3, 1, 0, 2]);
        assert_eq!(list.height(), 3);
        assert_eq!(list.level_keys(0), vec![1, 2, 3, 4]);
        assert_eq!(list.level_keys(2), vec![1, 4]);

        // exhausted source flattens everything again
        list.rebalance();
        list.check_invariants();
        assert_eq!(list.height(), 0);
        assert_eq!(list.tower_heights(), vec![0, 0, 0, 0]);
        assert_eq!(list.nodes.len(), 4 + 2);
    }

    #[test]
    fn test_clear() {
        let mut list = scripted(vec![2, 2, 2]);
        list.insert(1);
        list.insert(2);
        list.clear();
        list.check_invariants();

        assert_eq!(list.len(), 0);
        assert_eq!(list.height(), 0);
        assert!(!list.contains(&1));

        list.insert(3);
        list.check_invariants();
        assert_eq!(list.tower_heights(), vec![2]);
    }

    #[test]
    fn test_first_last() {
        let mut list = scripted(vec![]);
        list.insert(5);
        list.insert(1);
        list.insert(3);
        assert_eq!(list.first(), Some(&1));
        assert_eq!(list.last(), Some(&5));
    }

    #[test]
    fn test_iter_size_hint() {
        let mut list = scripted(vec![]);
        list.insert(2);
        list.insert(1);

        let mut iterator = list.iter();
        assert_eq!(iterator.len(), 2);
        assert_eq!(iterator.next(), Some(&1));
        assert_eq!(iterator.len(), 1);
        assert_eq!(iterator.next(), Some(&2));
        assert_eq!(iterator.next(), None);
        assert_eq!(iterator.next(), None);
    }

    #[test]
    fn test_into_iter() {
        let mut list = scripted(vec![1, 2, 0]);
        list.insert(3);
        list.insert(1);
        list.insert(2);
        assert_eq!(list.into_iter().collect::<Vec<u32>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_random_towers() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut keys: Vec<u32> = (0..2_000).collect();
        keys.shuffle(&mut rng);

        let mut list = SkipList::new(2, StdRng::seed_from_u64(11));
        for &key in &keys {
            assert!(list.insert(key));
        }
        list.check_invariants();
        assert!(list.tower_heights().iter().all(|&height| height < list.max_height()));

        keys.shuffle(&mut rng);
        for &key in &keys[..1_500] {
            assert!(list.remove(&key));
        }
        list.check_invariants();

        list.rebalance();
        list.check_invariants();
        let mut expected: Vec<u32> = keys[1_500..].to_vec();
        expected.sort();
        assert_eq!(list.iter().cloned().collect::<Vec<u32>>(), expected);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(u16),
        Remove(u16),
        Rebalance,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u16..128).prop_map(Op::Insert),
            3 => (0u16..128).prop_map(Op::Remove),
            1 => Just(Op::Rebalance)
        ]
    }

    proptest! {
        #[test]
        fn prop_matches_btreeset(seed in any::<u64>(), ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut list = SkipList::new(2, StdRng::seed_from_u64(seed));
            let mut expected = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Insert(key) => prop_assert_eq!(list.insert(key), expected.insert(key)),
                    Op::Remove(key) => prop_assert_eq!(list.remove(&key), expected.remove(&key)),
                    Op::Rebalance => list.rebalance(),
                }
                list.check_invariants();
                prop_assert_eq!(list.len(), expected.len());
            }

            prop_assert_eq!(
                list.iter().collect::<Vec<&u16>>(),
                expected.iter().collect::<Vec<&u16>>()
            );
            prop_assert_eq!(list.first(), expected.iter().next());
            prop_assert_eq!(list.last(), expected.iter().next_back());
        }
    }
}
