pub mod token;
pub mod token_cache;

pub use token::{Region, Token, TokenSet};
pub use token_cache::{CachePolicy, TokenCache};
