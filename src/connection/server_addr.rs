use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};

use crate::constants::DEFAULT_SERVER_PORT;

use super::AddrError;

const SERVER_ENV_VAR: &str = "CROCKET_SERVER";

/// Resolve the editor endpoint.
///
/// The `CROCKET_SERVER` environment variable overrides the default
/// `127.0.0.1:1338` using `host[:port]` syntax. Resolution happens
/// once, at init; a spec that resolves to nothing is an error the
/// session answers by forcing player mode.
pub fn resolve_server_addr() -> Result<SocketAddr, AddrError> {
    match env::var(SERVER_ENV_VAR) {
        Ok(spec) => resolve_spec(&spec),
        Err(_) => Ok(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            DEFAULT_SERVER_PORT,
        )),
    }
}

fn resolve_spec(spec: &str) -> Result<SocketAddr, AddrError> {
    let (host, port) = split_host_port(spec);
    let port = match port {
        Some(text) => text.parse::<u16>().map_err(|_| AddrError::Unresolved {
            spec: spec.to_string(),
        })?,
        None => DEFAULT_SERVER_PORT,
    };
    (host, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| AddrError::Unresolved {
            spec: spec.to_string(),
        })
}

/// Split a `host[:port]` spec at the first colon, the way the editor's
/// own clients read it.
fn split_host_port(spec: &str) -> (&str, Option<&str>) {
    match spec.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (spec, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_takes_the_first_colon() {
        assert_eq!(split_host_port("localhost"), ("localhost", None));
        assert_eq!(split_host_port("localhost:9000"), ("localhost", Some("9000")));
        assert_eq!(split_host_port("a:1:2"), ("a", Some("1:2")));
    }

    #[test]
    fn numeric_specs_resolve() {
        let addr = resolve_spec("127.0.0.1:9000").unwrap();
        assert_eq!(addr.port(), 9000);
        let addr = resolve_spec("127.0.0.1").unwrap();
        assert_eq!(addr.port(), DEFAULT_SERVER_PORT);
    }

    #[test]
    fn junk_specs_do_not_resolve() {
        assert!(resolve_spec("127.0.0.1:notaport").is_err());
        assert!(resolve_spec("no.such.host.invalid:1338").is_err());
    }
}
