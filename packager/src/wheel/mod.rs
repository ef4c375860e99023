//! Wheel assembly and reproducible serialisation.
//!
//! # Sub-modules
//!
//! - [`assembler`] - Turns archive entries into a [`PackageDescriptor`].
//! - [`descriptor`] - The assembled, immutable package description.
//! - [`launcher`] - Generated `__main__.py` that re-executes the binary.
//! - [`metadata`] - Email-style header blocks (METADATA, WHEEL, entry points).
//! - [`naming`] - Wheel file and dist-info directory names.
//! - [`record`] - The RECORD index of hashes and sizes.
//! - [`writer`] - Deterministic zip serialisation.

pub mod assembler;
pub mod descriptor;
pub mod launcher;
pub mod metadata;
pub mod naming;
pub mod record;
pub mod writer;

pub use assembler::{AssemblyContext, AssemblyError, assemble, assemble_archive};
pub use descriptor::{PackageDescriptor, PackageFile};
pub use naming::WheelName;
pub use writer::{WriteError, write_package};
