pub mod dto;
pub mod error;
pub mod extract;
pub mod form;
pub mod handlers;
pub mod routes;
