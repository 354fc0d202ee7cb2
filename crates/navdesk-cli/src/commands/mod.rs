pub mod replay;
pub mod resolve;
pub mod routes;
