// Typed wrappers for the RPC methods the pipeline consumes.
//
// Each wrapper builds the exact parameter set the server expects and
// returns raw result records; interpreting those records is the domain
// layer's job because field presence varies across server versions.

pub mod auth;
pub mod events;
pub mod problems;
pub mod triggers;
