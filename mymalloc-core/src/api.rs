//! The API of mymalloc-core.

mod configuration;
mod description;
mod error;
mod heap;
mod storage;

pub use configuration::{Configuration, DefaultConfiguration, Properties};
pub use description::{align4, Address, AllocationSize, BlockInfo, HEADER_SIZE};
pub use error::AllocError;
pub use heap::{Blocks, Heap};
pub use storage::{Region, Storage};

pub(crate) use description::ALIGNMENT;
