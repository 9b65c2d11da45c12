pub mod http_transport;
pub mod media_types;
pub mod metadata;
pub mod session;
pub mod transport;

pub use http_transport::HttpTransport;
pub use media_types::MediaTypes;
pub use metadata::DocumentMetadata;
pub use session::{Session, SessionProvider, StaticSessionProvider};
pub use transport::{DocumentLocator, Transport, UploadRequest};
