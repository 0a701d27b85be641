//! C5: the recorded-request store (spec §4.5). Captures a request sequence
//! during object/archive definition and replays it later against the live
//! backend, for `ObjectInstance` and `ReadArchive`.

mod macro_store;
mod replay;
mod request;

pub use macro_store::Macro;
pub use replay::RequestReplayer;
pub use request::RecordedRequest;
