//! Gene information plugin.
//!
//! Registers a "Gene Info" panel on the extra feature panel extension point
//! for features of type `gene`. The panel looks the gene up in a GraphQL
//! service and shows its identifier, description, product and synonyms.
//!
//! ```rust,ignore
//! let plugin = GeneInfoPlugin::new(ReqwestTransport::from_env()?);
//! let ctx = AppContext::builder().plugin(plugin).build_default()?;
//! ```

pub mod graphql;
pub mod plugin;
pub mod source;

pub use graphql::{GraphQlRequest, GraphQlTransport, ReqwestTransport};
pub use plugin::{GeneInfoPlugin, PANEL_NAME, PLUGIN_NAME};
pub use source::{GeneGeneralInformation, GeneInfoSource};
