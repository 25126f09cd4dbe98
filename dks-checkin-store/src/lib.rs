//! PostgREST participant store.
//!
//! Talks to the Supabase REST API the registration site writes to:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | fetch | `GET /rest/v1/{table}?select=*&uuid=eq.{id}` |
//! | update | `PATCH /rest/v1/{table}?uuid=eq.{id}` with `{"<flag column>": true}` |
//! | conditional update | same PATCH, also filtered on `<flag column>=not.is.true` |

pub mod client;
pub mod config;
pub mod row;

pub use client::PostgrestParticipantStore;
pub use config::{ConfigError, StoreConfig};
pub use row::{flag_column, ParticipantRow};
