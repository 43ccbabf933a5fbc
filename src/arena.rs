//! Slot allocator with handle-based addressing.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A handle to an object allocated in a `TypedArena<T>`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Entry {
    index: usize,
}

enum Block<T> {
    Occupied(T),
    Vacant(Option<Entry>),
}

/// An allocator that only allocates a single type of object and addresses it by `Entry`.
///
/// Objects are stored contiguously in a `Vec`. Deallocated blocks are threaded onto a free list
/// and handed out again by the next allocation, so a structure that churns through objects keeps
/// a stable footprint. Linked structures store `Entry` handles instead of references, which lets
/// them hold cyclic links without any unsafe code.
///
/// # Examples
///
/// ```
/// use skiplist_set::arena::TypedArena;
///
/// let mut arena = TypedArena::new();
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(x), 2);
/// assert!(arena.is_empty());
/// ```
pub struct TypedArena<T> {
    head: Option<Entry>,
    blocks: Vec<Block<T>>,
    len: usize,
}

impl<T> TypedArena<T> {
    /// Constructs a new, empty `TypedArena<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_set::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::new();
    /// ```
    pub fn new() -> Self {
        TypedArena {
            head: None,
            blocks: Vec::new(),
            len: 0,
        }
    }

    /// Allocates an object in the arena and returns its `Entry`. Vacant blocks are reused before
    /// the arena grows.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_set::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// ```
    pub fn allocate(&mut self, value: T) -> Entry {
        self.len += 1;
        match self.head.take() {
            None => {
                self.blocks.push(Block::Occupied(value));
                Entry {
                    index: self.blocks.len() - 1,
                }
            },
            Some(entry) => {
                let vacant_block = mem::replace(&mut self.blocks[entry.index], Block::Occupied(value));
                match vacant_block {
                    Block::Vacant(next_entry) => {
                        self.head = next_entry;
                        entry
                    },
                    Block::Occupied(_) => panic!("Expected a vacant block on the free list."),
                }
            },
        }
    }

    /// Deallocates an object in the arena and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `entry` corresponds to an invalid or vacant block.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_set::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.free(x), 0);
    /// ```
    pub fn free(&mut self, entry: Entry) -> T {
        if entry.index >= self.blocks.len() {
            panic!("Error: attempting to free invalid block.");
        }
        if let Block::Vacant(_) = self.blocks[entry.index] {
            panic!("Error: attempting to free vacant block.");
        }
        let old_block = mem::replace(&mut self.blocks[entry.index], Block::Vacant(self.head.take()));
        self.head = Some(entry);
        self.len -= 1;
        match old_block {
            Block::Occupied(value) => value,
            Block::Vacant(_) => unreachable!(),
        }
    }

    /// Returns an immutable reference to an object in the arena. Returns `None` if the entry
    /// does not correspond to an allocated object.
    pub fn get(&self, entry: Entry) -> Option<&T> {
        match self.blocks.get(entry.index) {
            Some(Block::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to an object in the arena. Returns `None` if the entry does
    /// not correspond to an allocated object.
    pub fn get_mut(&mut self, entry: Entry) -> Option<&mut T> {
        match self.blocks.get_mut(entry.index) {
            Some(Block::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the number of allocated objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no objects are allocated.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every object in the arena and releases all blocks. Previously issued entries become
    /// invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_set::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// arena.clear();
    /// assert_eq!(arena.get(x), None);
    /// ```
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.head = None;
        self.len = 0;
    }
}

impl<T> Default for TypedArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Entry> for TypedArena<T> {
    type Output = T;

    fn index(&self, entry: Entry) -> &Self::Output {
        self.get(entry).expect("Error: entry out of bounds.")
    }
}

impl<T> IndexMut<Entry> for TypedArena<T> {
    fn index_mut(&mut self, entry: Entry) -> &mut Self::Output {
        self.get_mut(entry).expect("Error: entry out of bounds.")
    }
}
