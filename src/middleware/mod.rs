/*
 * Responsibility
 * - Public interface of the Router-level middleware
 * - auth: permission gate in front of handlers
 * - cors / http / security_headers: cross-cutting transport concerns
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
