//! Configuration module

mod site;

pub use site::CmsConfig;
pub use site::RenderConfig;
pub use site::SourceKind;
