pub mod server;
pub mod transport;

pub use server::{classify_recv_error, RecvErrorKind, ResolverLoop};
pub use transport::UdpTransport;
