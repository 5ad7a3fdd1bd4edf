//! Configuration section definitions.
//!
//! Each module corresponds to a section in `pubtree.toml`:
//!
//! | Module    | TOML Section  | Purpose                              |
//! |-----------|---------------|--------------------------------------|
//! | `repo`    | `[repo]`      | Repository id, working dir, url      |
//! | `publish` | `[publish]`   | Publish root, worker count           |
//! | `http`    | `[http]`      | Download urls and manifest (opt.)    |

mod http;
mod publish;
mod repo;

pub use http::HttpConfig;
pub use publish::PublishConfig;
pub use repo::RepoConfig;
