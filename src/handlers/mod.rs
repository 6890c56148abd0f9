// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer JWT when authorization is required)
pub mod public;    // /login, /register, /upload, /health
pub mod protected; // Generated resource routes under the API prefix
