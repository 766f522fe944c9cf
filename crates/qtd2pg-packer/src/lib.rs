pub mod error;
pub mod packer;
pub mod request;
pub mod store;

pub use error::PackError;
pub use packer::RecordPacker;
pub use request::{DatabaseTarget, PackOutcome, PackRequest, VideoInput};
pub use store::{PgSession, PgStore, SpatialStore, StoreSession};
