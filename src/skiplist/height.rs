use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;
use tracing::debug;

/// A source of unbiased coin flips used to pick tower heights.
pub trait HeightSource {
    /// Returns the next coin flip.
    fn flip(&mut self) -> bool;
}

impl HeightSource for StdRng {
    fn flip(&mut self) -> bool {
        self.gen()
    }
}

/// A deterministic `HeightSource` that replays a fixed sequence of flips and yields `false` once
/// the sequence is exhausted.
///
/// # Examples
/// ```
/// use skiplist_set::skiplist::{HeightSource, Scripted};
///
/// let mut source = Scripted::new(vec![true, false]);
/// assert!(source.flip());
/// assert!(!source.flip());
/// assert!(!source.flip());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Scripted {
    flips: VecDeque<bool>,
}

impl Scripted {
    /// Constructs a source that yields `flips` in order.
    pub fn new<I>(flips: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        Scripted {
            flips: flips.into_iter().collect(),
        }
    }

    /// Constructs a source that produces the given tower heights, one per insertion. Each height
    /// must stay below the height cap minus one, otherwise the terminating `false` of that tower
    /// is consumed by the next one.
    ///
    /// # Examples
    /// ```
    /// use skiplist_set::skiplist::{HeightSource, Scripted};
    ///
    /// let mut source = Scripted::towers(vec![2, 0]);
    /// let flips: Vec<bool> = (0..4).map(|_| source.flip()).collect();
    /// assert_eq!(flips, vec![true, true, false, false]);
    /// ```
    pub fn towers<I>(heights: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut flips = VecDeque::new();
        for height in heights {
            flips.extend((0..height).map(|_| true));
            flips.push_back(false);
        }
        Scripted { flips }
    }
}

impl HeightSource for Scripted {
    fn flip(&mut self) -> bool {
        self.flips.pop_front().unwrap_or(false)
    }
}

/// Draws tower heights from a geometric distribution truncated at `max_height - 1`, and scales
/// `max_height` with the number of elements.
///
/// `max_height` doubles together with `height_changes` whenever `len / height_changes` reaches
/// `max_height`. A doubling is undone once the same condition no longer holds for the halved
/// pair, so the cap never drops below its initial value.
pub struct HeightGenerator<R> {
    source: R,
    initial_max_height: usize,
    max_height: usize,
    height_changes: usize,
}

impl<R> HeightGenerator<R>
where
    R: HeightSource,
{
    pub fn new(max_height: usize, source: R) -> Self {
        HeightGenerator {
            source,
            initial_max_height: max_height,
            max_height,
            height_changes: 1,
        }
    }

    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Returns the number of levels above level 0 a new tower should occupy.
    pub fn generate(&mut self) -> usize {
        let mut height = 0;
        while height + 1 < self.max_height && self.source.flip() {
            height += 1;
        }
        height
    }

    pub fn grow(&mut self, len: usize) {
        while len / self.height_changes >= self.max_height {
            self.max_height *= 2;
            self.height_changes *= 2;
            debug!(len, max_height = self.max_height, "doubled height cap");
        }
    }

    pub fn shrink(&mut self, len: usize) {
        while self.height_changes > 1 && len / (self.height_changes / 2) < self.max_height / 2 {
            self.max_height /= 2;
            self.height_changes /= 2;
            debug!(len, max_height = self.max_height, "halved height cap");
        }
    }

    pub fn reset(&mut self) {
        self.max_height = self.initial_max_height;
        self.height_changes = 1;
    }
}
