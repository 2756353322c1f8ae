pub mod dispatcher;
pub mod headers;
pub mod payload;

pub use dispatcher::{DispatchResult, LikeDispatcher};
