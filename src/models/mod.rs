mod epic;
mod issue;
mod kind;
mod page;
mod patch;
mod people;
mod project;
pub mod projection;
mod status;
mod story;
mod task;

pub use epic::*;
pub use issue::*;
pub use kind::*;
pub use page::*;
pub use patch::*;
pub use people::*;
pub use project::*;
pub use status::*;
pub use story::*;
pub use task::*;

/// A Taiga record as it travels through the service: a plain JSON object.
pub type Record = serde_json::Map<String, serde_json::Value>;
