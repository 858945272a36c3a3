//! facesort-fs: filesystem side of sorting. Which files are media, where
//! they go, and how they get there.

pub mod destinations;
pub mod media;
pub mod mover;
pub mod scan;

pub use destinations::{CreateError, Destination, Destinations};
pub use media::MediaKind;
pub use mover::{move_into, MoveError};
pub use scan::{scan_files, ScanResult};
