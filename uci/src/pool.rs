use std::path::Path;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use evaluation::EngineError;

use super::client::EvalClient;

/// A fixed-size pool of connected engine clients.
///
/// The external engine is a single-threaded bottleneck, so each client
/// owns exactly one process and the pool bounds how many evaluation
/// requests are in flight at once. Checkout blocks until a client is
/// free.
pub struct ClientPool {
    clients: Mutex<Vec<EvalClient>>,
    available: Condvar,
}

impl ClientPool {
    /// Spawn and handshake `size` engine processes.
    pub fn connect(path: &Path, size: usize, timeout: Duration) -> Result<Self, EngineError> {
        let mut clients = Vec::with_capacity(size);
        for _ in 0..size.max(1) {
            clients.push(EvalClient::connect(path, timeout)?);
        }

        Ok(Self {
            clients: Mutex::new(clients),
            available: Condvar::new(),
        })
    }

    /// Run `f` with exclusive use of one client, returning it to the pool
    /// afterwards.
    pub fn with_client<T>(&self, f: impl FnOnce(&mut EvalClient) -> T) -> T {
        let mut client = {
            let mut guard = self.clients.lock().unwrap();
            loop {
                if let Some(client) = guard.pop() {
                    break client;
                }
                guard = self.available.wait(guard).unwrap();
            }
        };

        let out = f(&mut client);

        self.clients.lock().unwrap().push(client);
        self.available.notify_one();

        out
    }
}
