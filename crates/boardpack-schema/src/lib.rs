//! Typed records for board-manager package indexes.
//!
//! This crate defines the data layer: the upstream `PackageIndex` with its
//! first `Package`, the platform and tool templates that name an archive URL,
//! the described `PlatformEntry`/`ToolEntry` records that always carry an
//! `ArchiveDescriptor`, and the JSON layout used to write an index back out.

pub mod entry;
pub mod format;
pub mod index;

pub use entry::{
    ArchiveDescriptor, BoardRef, PlatformEntry, PlatformTemplate, SystemTemplate, SystemVariant,
    ToolDependency, ToolEntry, ToolTemplate,
};
pub use format::{to_index_json, IndexFormatter};
pub use index::{parse_index_file, parse_index_slice, IndexError, Package, PackageIndex};
