//! C4: the request-dispatcher table (spec §4.4) plus the context it reads
//! and writes (spec §5's "everything mutable lives per context"). This is
//! the crate that ties C1 (`rib-model`/`rib-config`), C6 (`rib-handles`),
//! C7 (`rib-state`), and C5 (`rib-macro`) together behind the single
//! `dispatch` entry point a host drives per parsed request.

mod args;
mod bind;
mod context;
mod dispatch;
mod handlers;
mod replay;
mod shape;

pub use context::{ArchiveLoader, Context, NullArchiveLoader};
pub use dispatch::{dispatch, dispatch_bound};
pub use replay::Replayer;
