// Application layer: the import commands exposed by the CLI.

pub mod import;

pub use import::{import_assets, import_bibtex};
