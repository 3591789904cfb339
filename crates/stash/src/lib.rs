//! # Stash
//!
//! Allocation-free storage primitives for soft-realtime simulation loops.
//!
//! Everything in this crate reserves its memory once, at construction, and
//! never grows afterwards. Running out of room is reported as an error so that
//! capacity planning happens up front instead of as a silent reallocation in
//! the middle of a frame.
//!
//! - [`FixedVec`]: array-backed collection with a hard capacity, linear or
//!   binary [`find`](FixedVec::find) and in-place sorting through a pluggable
//!   [`SortStrategy`]
//! - [`ObjectPool`]: `C` pre-built instances recycled through
//!   [`allocate`](ObjectPool::allocate) / [`release`](ObjectPool::release),
//!   addressed by generation-checked [`PoolHandle`]s
//!
//! ## Quick Start
//!
//! ```
//! use stash::{FixedVec, InsertionSort, ObjectPool, Poolable};
//!
//! let mut scores: FixedVec<u32> = FixedVec::new(4);
//! scores.push(30).unwrap();
//! scores.push(10).unwrap();
//! scores.push(20).unwrap();
//! scores.sort(&InsertionSort, &|a: &u32, b: &u32| a.cmp(b), false);
//! assert_eq!(scores.as_slice(), &[10, 20, 30]);
//!
//! #[derive(Default)]
//! struct Spark { life: f32 }
//! impl Poolable for Spark {
//!     fn reset(&mut self) { self.life = 0.0; }
//! }
//!
//! let mut sparks: ObjectPool<Spark> = ObjectPool::with_default(2);
//! let handle = sparks.allocate().unwrap();
//! sparks.get_mut(handle).unwrap().life = 1.0;
//! sparks.release(handle).unwrap();
//! assert_eq!(sparks.allocated_count(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fixed_vec;
pub mod pool;
pub mod sort;

// Re-exports for convenience
pub use fixed_vec::{CapacityError, FixedVec, OverflowPolicy};
pub use pool::{ObjectPool, PoolError, PoolHandle, Poolable};
pub use sort::{Comparator, InsertionSort, QuickSort, ShellSort, SortStrategy};
