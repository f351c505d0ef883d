//! Outbound OAuth exchange adapter: one reqwest engine parameterised by
//! per-provider protocol descriptors.

mod descriptor;
mod dto;
mod http_exchange;

pub use descriptor::{ProviderDescriptor, TokenRequestStyle};
pub use http_exchange::{HttpOauthExchange, OauthClientConfig, OauthClientSet};
