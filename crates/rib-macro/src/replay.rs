//! Replay boundary: something that knows how to turn a [`RecordedRequest`]
//! back into the one backend call it was originally bound to. `rib-macro`
//! doesn't own the name -> handler table (that's C4's); it only needs this
//! seam to drive it during replay.

use crate::RecordedRequest;
use rib_backend::{Backend, BackendResult};

pub trait RequestReplayer {
    fn replay(&mut self, backend: &mut dyn Backend, request: &RecordedRequest) -> BackendResult<()>;
}
