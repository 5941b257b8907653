//! Qt `.ts` translation catalogs: parsing, canonical serialization, QA,
//! lupdate-style merging, translation memory and machine translation,
//! served over a line-delimited JSON protocol by the `tscat-core` binary.

pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use error::{CatalogError, CoreError};
pub use model::catalog::{Catalog, Context, Location, Message, MessageStatus};
pub use model::config::{CoreConfig, ParseOptions, StatusPolicy};
pub use parsers::ts::{parse, Parsed};
pub use services::rebuild::rebuild;
