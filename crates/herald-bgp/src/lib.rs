//! BGP path construction and the embedded-speaker facade (§4.4).

pub mod bfd;
pub mod error;
pub mod path;
pub mod speaker;

pub use error::BgpError;
pub use path::{build_path, AnycastPath, OriginType};
pub use speaker::{PeerStats, RouteStats, Speaker};
