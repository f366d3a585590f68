pub mod config;
pub mod project;
pub mod todo;
pub mod workspace;

pub use config::*;
pub use project::*;
pub use todo::*;
pub use workspace::*;
