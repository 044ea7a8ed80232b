use std::io;

use thiserror::Error;

/// Errors that can occur on the editor connection.
///
/// Every one of them is fatal to the session: the caller closes the
/// socket and reports a disconnect, never retrying on the same stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer closed the connection (or an orderly shutdown was
    /// observed mid-read)
    #[error("Connection closed by the editor")]
    Closed,

    /// The server's greeting did not match the expected handshake reply
    #[error("Editor greeting mismatch; peer is not a sync-tracker server")]
    BadGreeting,

    /// A socket operation failed
    #[error("Socket I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Errors that can occur while resolving the editor endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddrError {
    /// The `CROCKET_SERVER` spec did not resolve to any address
    #[error("Cannot resolve sync server address '{spec}'")]
    Unresolved { spec: String },
}
