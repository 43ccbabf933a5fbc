//! Construction parameters for a skiplist set.

use crate::error::{Error, Result};

/// The height cap an empty list starts with.
pub const DEFAULT_MAX_HEIGHT: usize = 2;

/// Parameters used when constructing a `SkipListSet`.
///
/// # Examples
/// ```
/// use skiplist_set::{Config, SkipListSet};
///
/// let config = Config::new().max_height(4).seed(7);
/// let mut set = SkipListSet::with_config(config).unwrap();
/// set.insert(1);
/// assert_eq!(set.max_height(), 4);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    max_height: usize,
    seed: Option<u64>,
}

impl Config {
    /// Returns the default configuration: a height cap of 2 and an entropy-seeded random source.
    pub fn new() -> Self {
        Config {
            max_height: DEFAULT_MAX_HEIGHT,
            seed: None,
        }
    }

    /// Sets the initial height cap. The cap still doubles and halves with the number of elements.
    pub fn max_height(mut self, max_height: usize) -> Self {
        self.max_height = max_height;
        self
    }

    /// Seeds the random source so tower heights are reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn get_max_height(&self) -> usize {
        self.max_height
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_height == 0 {
            return Err(Error::InvalidMaxHeight(self.max_height));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
