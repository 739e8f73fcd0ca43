// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Admin (active admin session)
//
// Route wiring lives in app.rs; each tier documents its own middleware.
pub mod public; // Tier 1: catalog reads and /auth/*
pub mod admin;  // Tier 2: catalog writes, settings, /users

pub mod utils;
