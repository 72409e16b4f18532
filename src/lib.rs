//! volfs - A multi-volume virtual file system
//!
//! Scripts address files on several independent volumes through one path
//! grammar (`archive:/docs/a.txt`, `1:/boot`, `[local]/tmp`, `../x`). The crate
//! resolves those paths, routes them to the owning volume, copies and moves
//! items across volumes, and persists structured values as tagged JSON.

pub mod copy_move;
pub mod fs;
pub mod functions;
pub mod logging;
pub mod path;
pub mod serialization;
pub mod session;

pub use copy_move::{copy_item, move_item};
pub use fs::{
    BackendError, DirectoryBackend, FileContent, InMemoryBackend, StorageBackend, Volume,
    VolumeDirectory, VolumeError, VolumeFile, VolumeItem,
};
pub use functions::{run_script, Function, FunctionError, FunctionRegistry, LineOutcome};
pub use path::{ResolutionContext, VolumeId, VolumePath};
pub use serialization::{decode, encode, read_structured, write_structured, CodecError, Value};
pub use session::{LayoutConfig, Session, SessionOptions, VolumeRegistry};
