pub mod assets;
pub mod bibtex;
pub mod etl;
pub mod latex;
pub mod names;
pub mod pipeline;
pub mod publication;
pub mod slug;
pub mod writer;

pub use crate::domain::model::{BibEntry, Bibliography, ImportReport, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
