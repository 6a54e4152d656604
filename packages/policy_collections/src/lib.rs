#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Generic containers whose elements enter and leave through a pluggable policy.
//!
//! This crate provides three containers:
//!
//! - [`DynArray`] - a contiguous, growable array with explicit capacity management
//! - [`LinkedList`] - a singly linked list whose nodes are addressed through [`NodeId`] handles
//! - [`Stack`] - a last-in-first-out stack layered on [`LinkedList`]
//!
//! Each container holds one [`ElementPolicy`], fixed at creation. Values passed to a container
//! by reference are never stored directly: the policy makes the container-owned copy. When an
//! element is overwritten, removed or left behind when the container is dropped, the policy
//! releases it. The default policy, [`CloneElements`], clones and drops like the standard
//! collections do. [`CopyWith`], [`FreeWith`] and [`FnPolicy`] replace one or both hooks with
//! caller-supplied functions.
//!
//! # Allocation failures
//!
//! Operations that may allocate return [`Result`]. Running out of memory or requesting a
//! capacity that cannot be expressed is reported as an [`Error`] and leaves the container
//! unchanged, instead of aborting the process. Contract violations such as out-of-range
//! indexes or stale node handles panic.
//!
//! # Examples
//!
//! ## Growable array
//!
//! ```
//! use policy_collections::DynArray;
//!
//! let mut array = DynArray::new();
//!
//! for value in 0..5 {
//!     array.append(&value).unwrap();
//! }
//!
//! assert_eq!(array.as_slice(), [0, 1, 2, 3, 4]);
//! assert_eq!(array.capacity(), 8);
//!
//! array.insert(1, [10, 11]).unwrap();
//! assert_eq!(array.as_slice(), [0, 10, 11, 1, 2, 3, 4]);
//! ```
//!
//! ## Linked list
//!
//! ```
//! use policy_collections::LinkedList;
//!
//! let mut list = LinkedList::new();
//! let first = list.append(None, &"alpha".to_string()).unwrap();
//! list.insert_after(first, &"beta".to_string()).unwrap();
//!
//! list.reverse();
//!
//! assert_eq!(
//!     list.iter().map(String::as_str).collect::<Vec<_>>(),
//!     ["beta", "alpha"]
//! );
//! ```
//!
//! ## Custom free policy
//!
//! ```
//! use std::cell::RefCell;
//!
//! use policy_collections::{FreeWith, Stack};
//!
//! let released = RefCell::new(Vec::new());
//!
//! let mut stack = Stack::with_policy(FreeWith::new(|value: u32| {
//!     released.borrow_mut().push(value);
//! }));
//!
//! stack.push(&1).unwrap();
//! stack.push(&2).unwrap();
//! stack.pop();
//!
//! assert_eq!(*released.borrow(), [2]);
//! ```

mod builder;
mod dyn_array;
mod error;
mod linked_list;
mod node_arena;
mod node_id;
mod policy;
mod raw_buffer;
mod stack;

pub use builder::*;
pub use dyn_array::DynArray;
pub use error::*;
pub use linked_list::{Iter, LinkedList};
pub(crate) use node_arena::*;
pub use node_id::NodeId;
pub use policy::*;
pub(crate) use raw_buffer::*;
pub use stack::Stack;
