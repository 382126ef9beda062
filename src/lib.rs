pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod news;
pub mod storage;
pub mod summary;

pub use app::Services;
pub use config::Config;
pub use error::{DeleteError, Error, FetchError, Result, SubmitError};
