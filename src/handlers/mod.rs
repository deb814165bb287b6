// Handler modules, grouped by concern. `auth` routes are public (they are
// how a session is obtained); `list` and the secret submission live behind
// the session gate wired up in the router.
pub mod auth;
pub mod list;
pub mod secrets;
