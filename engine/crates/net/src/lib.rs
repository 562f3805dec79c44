pub mod connection;
pub mod markup;
pub mod server;
pub mod telnet;

pub use connection::{Connection, ConnectionWriter, LineReader, ReadError};
pub use server::run_tcp_server;
