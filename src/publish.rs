//! Categorized publish-and-version pipeline.

pub mod classifier;
pub mod docs;
pub mod materialize;
pub mod publisher;
pub mod render;
pub mod scanner;
pub mod session;

pub use classifier::{classify, Suggestion};
pub use docs::{CommandDocsRegenerator, DocsRegenerator, ReadmeGenerator};
pub use materialize::{materialize, Materialized, PublicLayout};
pub use publisher::{CategoryOutcome, CategoryPublisher, OutcomeStatus, PublishStage};
pub use render::{NbconvertRenderer, Renderer};
pub use scanner::{ArtifactScanner, Catalog};
pub use session::{AcceptDefaults, Operator, PublishSession, Selection, SessionReport};
