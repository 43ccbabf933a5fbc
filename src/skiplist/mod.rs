//! Probabilistic linked hierarchy of subsequences.

mod height;
mod list;
mod node;
mod set;

pub use self::height::{HeightSource, Scripted};
pub use self::list::{IntoIter, Iter};
pub use self::set::{Comparator, SkipListSet};
