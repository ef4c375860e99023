//! Release metadata: the API model, asset naming, and the resolver that
//! fetches a release by tag.
//!
//! # Sub-modules
//!
//! - [`asset_name`] - Parsing of `<name>-<os>-<arch>-<version>.<ext>` asset names.
//! - [`model`] - `Release` and `Asset` as returned by the releases API.
//! - [`resolver`] - `ReleaseResolver` trait and its GitHub implementation.

pub mod asset_name;
pub mod model;
pub mod resolver;

pub use asset_name::AssetName;
pub use model::{Asset, Release, parse_release};
pub use resolver::{GitHubResolver, ReleaseResolver, ResolveError};
