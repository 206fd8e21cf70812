//! Infrastructure Layer
//!
//! Store implementations and schema setup.

pub mod memory;
pub mod postgres;
pub mod schema;

pub use memory::InMemoryAuthRepository;
pub use postgres::PgAuthRepository;
pub use schema::initialize_schema;
