pub mod handle;
pub mod hasura;
pub mod schema;
