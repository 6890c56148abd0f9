// handlers/protected/mod.rs - Routes gated by the bearer-token middleware
//
// Gating is applied by the router (see `server::resource_routes`) only when
// authorization is required; the handlers themselves never inspect tokens.

pub mod resource;
