//! Response decoder module
//!
//! Turns raw response bodies into JSON values. Feed listings wrap their
//! shots in a `shots` array next to paging counters; [`JsonDecoder::shots`]
//! pulls that array out in server order.

mod decoders;
mod types;

pub use decoders::{JsonDecoder, SHOTS_PATH};
pub use types::{PageInfo, RecordDecoder};
