//! Configuration-channel host for Vigil.
//!
//! This binary runs as a standalone request/response endpoint for a host
//! configuration surface. It communicates over stdin/stdout with a
//! length-prefixed JSON protocol and shares the policy database with the
//! monitor process.

use std::sync::{Arc, Mutex};
use vigil::host::ConfigHost;
use vigil::platform::StubPermissions;
use vigil::policy::PolicyStore;

fn main() {
    let db = match vigil::open_database() {
        Ok(db) => db,
        Err(e) => {
            eprintln!("vigil-host error: {}", e);
            std::process::exit(1);
        }
    };

    let policy = Arc::new(PolicyStore::new(Arc::new(Mutex::new(db))));
    let host = ConfigHost::new(policy, Arc::new(StubPermissions));

    // Serve requests until the peer closes the connection
    if let Err(e) = host.run() {
        // EOF is the expected way for the configuration surface to hang up
        if e.kind() != std::io::ErrorKind::UnexpectedEof {
            eprintln!("vigil-host error: {}", e);
            std::process::exit(1);
        }
    }
}
