mod cache;
mod fetcher;
mod key_set;

pub use cache::{JwksCache, JwksCachePolicy};
pub use fetcher::{HttpJwksFetcher, JwksError, JwksFetcher, parse_jwks};
pub use key_set::{KeySet, SigningKey};
