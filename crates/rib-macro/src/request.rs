//! A single recorded request (spec §3 "Recorded request"): everything
//! needed to replay one dispatched call, deep-copied at capture time so it
//! never retains pointers into the parser's scratch buffers.

use rib_backend::HandleId;
use rib_model::{ParameterList, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub name: String,
    pub line: u32,
    pub args: Vec<Value>,
    pub params: ParameterList,
    /// Set for handle-emitting requests (`ObjectBegin`, `LightSource`,
    /// `AreaLightSource`, `ArchiveBegin`) once the backend has returned one.
    pub handle: Option<HandleId>,
}

impl RecordedRequest {
    pub fn new(name: impl Into<String>, line: u32, args: Vec<Value>, params: ParameterList) -> Self {
        Self {
            name: name.into(),
            line,
            args,
            params,
            handle: None,
        }
    }

    pub fn with_handle(mut self, handle: HandleId) -> Self {
        self.handle = Some(handle);
        self
    }
}
