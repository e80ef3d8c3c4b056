//! # anyfs
//!
//! A uniform virtual filesystem substrate over local disks, in-memory
//! stores, and the wrapper layers (caching, transactions, key-value
//! projection) that compose on top of them.
//!
//! The core traits ([`Fs`], [`FsFull`]) are the adapter contract a backend
//! implements; [`VfsExt`] is the richer path-oriented API every backend
//! gets for free on top of that contract.
//!
//! ---
//!
//! ## Quick Start
//!
//! Most users only need [`Fs`] — it covers 90% of use cases.
//!
//! A typical usage pattern with any backend that implements `Fs`:
//!
//! ```rust
//! use anyfs::Fs;
//! use std::path::Path;
//!
//! // Generic function that works with any Fs implementation
//! fn work_with_files<B: Fs>(backend: &B) -> Result<(), anyfs::FsError> {
//!     let data = backend.read(Path::new("/input.txt"))?;
//!     backend.write(Path::new("/output.txt"), &data)?;
//!     backend.create_dir_all(Path::new("/archive/2024"))?;
//!     for entry in backend.read_dir(Path::new("/"))? {
//!         println!("{}", entry?.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Fs`] | Basic filesystem trait — read, write, and directory operations |
//! | [`FsFull`] | Extended filesystem — adds links, permissions, sync, stats |
//! | [`FsError`] | Comprehensive error type with context |
//! | [`Metadata`] | File/directory metadata (size, type, times, permissions) |
//! | [`DirEntry`] | Single directory listing entry |
//!
//! ---
//!
//! ## Which Trait Should I Use?
//!
//! **[`Fs`]** — When you need basic file operations.
//! - Use for: Config files, data serialization, file processing, simple I/O
//! - Methods: `read`, `write`, `create_dir`, `read_dir`, `exists`, `metadata`
//! - Coverage: **90% of use cases**
//!
//! **[`FsFull`]** — When you need filesystem features beyond basic I/O.
//! - Use for: Backup tools, file managers, archive extraction
//! - Adds: `symlink`, `hard_link`, `set_permissions`, `sync`, `statfs`
//! - Includes: Everything in [`Fs`]
//!
//! ---
//!
//! ## Trait Hierarchy
//!
//! ```text
//! Layer 1 (Core):     FsRead + FsWrite + FsDir = Fs
//!                                               ↓
//! Layer 2 (Extended): Fs + FsLink + FsPermissions + FsSync + FsStats = FsFull
//! ```
//!
//! All composite traits ([`Fs`], [`FsFull`]) have **blanket
//! implementations**. Just implement the component traits and you get the composite
//! trait for free.
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`. Errors include context:
//!
//! ```rust
//! use anyfs::FsError;
//! use std::path::PathBuf;
//!
//! // Errors include the path that caused the problem
//! let err = FsError::NotFound { path: PathBuf::from("/missing.txt") };
//! assert_eq!(err.to_string(), "not found: /missing.txt");
//!
//! // Permission errors include the operation
//! let err = FsError::PermissionDenied {
//!     path: PathBuf::from("/secret"),
//!     operation: "read",
//! };
//! assert_eq!(err.to_string(), "read: permission denied: /secret");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. Methods take `&self` (not `&mut self`),
//! enabling safe concurrent access. Backends use interior mutability internally.
//!
//! You can safely share a backend across threads using `Arc<B>` and spawn
//! concurrent operations without explicit locking at the call site.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`Metadata`], [`DirEntry`], [`Permissions`], etc. |
//!
//! ---
//!
//! ## Crate Organization
//!
//! This crate bundles the core traits, two reference backends
//! ([`MemoryFs`], [`LocalFs`]), and the substrate built on top of them:
//! the registry and instance cache ([`Registry`], [`InstanceCache`]),
//! the directory-listing cache ([`ListingCache`]), read-buffer
//! strategies (`buffer` module), caching wrapper filesystems
//! (`cache_fs` module), key-value projection ([`FsMapper`]),
//! transactions ([`Transaction`]), and the `open`/`open_files` URL
//! resolution helpers.

// Private modules
mod error;
mod ext;
mod layer;
mod markers;
mod path_resolver;
mod traits;
mod types;

// New modules - path-oriented virtual filesystem layer
mod async_core;
mod async_vfs;
mod backends;
mod buffer;
mod cache_fs;
mod config;
mod file;
mod instance_cache;
mod listing_cache;
mod mapper;
mod open;
mod path;
mod registry;
mod transaction;
mod vfs;

// Public re-exports - error types
pub use error::{FsError, OnError, VfsError, VfsResult};

// Public re-exports - core types
pub use types::{DirEntry, EntryKind, FileEntry, FileType, Metadata, Permissions, StatFs};

// Public re-exports - Layer 1 core traits
pub use traits::{Fs, FsDir, FsRead, FsWrite, ReadDirIter};

// Public re-exports - Layer 2 extended traits
pub use traits::{FsFull, FsLink, FsPath, FsPermissions, FsStats, FsSync};

// Public re-exports - path resolution
pub use path_resolver::PathResolver;

// Public re-exports - infrastructure
pub use ext::FsExt;
pub use layer::{Layer, LayerExt};
pub use markers::SelfResolving;

// Public re-exports - URL/path chain grammar
pub use path::{parse_chain, strip_protocol, unstrip_protocol, ChainKwargs, ParsedUrl, UrlChainLink};

// Public re-exports - registry, caches, async core
pub use async_core::{run_coros_in_chunks, sync, Loop};
pub use async_vfs::{AsyncFs, SyncBridgeFs};
pub use cache_fs::{
    BlockSparseCache, BlockSparseCacheLayer, FreshnessPolicy, ManifestEntry, SimpleCache,
    SimpleCacheLayer, WholeFileCache, WholeFileCacheLayer,
};
pub use config::VfsConfig;
pub use file::{BufferedFile, FileState};
pub use instance_cache::InstanceCache;
pub use listing_cache::ListingCache;
pub use mapper::FsMapper;
pub use open::{open, open_files, open_local, Compression, OpenFile, OpenMode, OpenOptions};
pub use registry::Registry;
pub use transaction::Transaction;
pub use vfs::{copy_between, get, put, CopyOptions, VfsExt};

// Public re-exports - bundled backends
pub use backends::{LocalFs, MemoryFs};

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::FsExtJson;
