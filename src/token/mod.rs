pub mod claims;
pub mod factory;
pub mod manager;
#[cfg(test)]
pub(crate) mod test_keys;

pub use claims::{Claims, Token};
pub use factory::{build_token_manager, default_token_manager};
pub use manager::{
    JwtTokenManager, SERVICE_ACCOUNT_SCOPE, TokenManager, TokenManagerKey,
    context_with_token_manager, read_token_manager_from_context,
};
