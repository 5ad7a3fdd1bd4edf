//! Publish engine: symlink trees exposed through one atomic swap.
//!
//! # Module Structure
//!
//! | Module      | Purpose                                           |
//! |-------------|---------------------------------------------------|
//! | `error`     | `LinkError` (per unit), `PublishError` (fatal)    |
//! | `fs`        | directory creation, link creation, public swap    |
//! | `symlinks`  | parallel per-unit linking                         |
//! | `tree`      | `ContentTreePublisher`, `Repository`              |
//! | `http`      | `HttpPublisher`: download urls + manifest         |
//! | `manifest`  | manifest document                                 |
//! | `report`    | `PublishReport`                                   |

mod error;
pub mod fs;
pub mod http;
pub mod manifest;
mod report;
pub mod symlinks;
mod tree;

pub use error::{LinkError, PublishError};
pub use http::{Alias, HttpPublisher};
pub use manifest::{MANIFEST_FILE_NAME, Manifest};
pub use report::{PublishDetails, PublishReport, PublishSummary, UnitError};
pub use symlinks::handle_symlinks;
pub use tree::{ContentTreePublisher, LinkedUnit, Repository};
