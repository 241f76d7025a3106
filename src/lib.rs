//! HTTP adapter exposing a batch-append operation backed by the Feishu
//! Bitable API. Inbound requests invoke registered operations; each
//! invocation exchanges app credentials for a tenant access token and
//! forwards the record batch to the remote table.

pub mod feishu;
pub mod server;
pub mod tools;
