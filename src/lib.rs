//! pubtree - publish content repositories as symlink trees.
//!
//! A repository's units are linked into its working directory, then exposed
//! at `publish_root/<relative_url>` by swapping one public symlink. Sibling
//! repositories may not claim overlapping relative urls.
//!
//! | Module      | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | `unit`      | content units and their relative paths          |
//! | `namespace` | relative url conflict checking                  |
//! | `publish`   | symlink trees, HTTP decoration, reports         |
//! | `config`    | `pubtree.toml`                                  |
//! | `cli`       | command definitions and handlers                |
//! | `logger`    | `log!`/`debug!`, progress line                  |

pub mod cli;
pub mod config;
pub mod logger;
pub mod namespace;
pub mod publish;
pub mod unit;
pub mod utils;
