/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Bounded pool of outbound connections.

use std::collections::{HashMap, VecDeque};

use futures::future::join_all;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, instrument, trace};

use super::protocol::write_message;
use crate::message::{Address, HexameterError};

/// One outbound socket bound to a single target.
#[derive(Debug)]
pub(crate) struct Connection {
    target: Address,
    stream: TcpStream,
}

impl Connection {
    pub(crate) async fn open(target: &Address) -> Result<Self, HexameterError> {
        let stream = TcpStream::connect((target.host(), target.port()))
            .await
            .map_err(|e| HexameterError::Io(format!("connect to {target} failed: {e}")))?;
        stream.set_nodelay(true)?;
        trace!(peer = %target, "connection opened");
        Ok(Self { target: target.clone(), stream })
    }

    pub(crate) async fn write<P: AsRef<[u8]>>(
        &mut self,
        parts: &[P],
    ) -> Result<(), HexameterError> {
        write_message(&mut self.stream, parts).await
    }

    pub(crate) async fn close(mut self) {
        trace!(peer = %self.target, "connection closed");
        // The peer may already be gone; nothing useful to do with the error.
        let _ = self.stream.shutdown().await;
    }
}

/// Outbound connections keyed by target, evicted first-in first-out.
///
/// At most `capacity` connections are cached. Reusing a cached connection does not
/// change its position: the target inserted earliest is always the next to go. With a
/// capacity of `0` nothing is cached and every delivery opens a fresh connection that
/// is closed right after the write.
#[derive(Debug)]
pub(crate) struct ConnectionPool {
    capacity: usize,
    connections: HashMap<Address, Connection>,
    recents: VecDeque<Address>,
    closed: bool,
}

impl ConnectionPool {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            connections: HashMap::with_capacity(capacity),
            recents: VecDeque::with_capacity(capacity),
            closed: false,
        }
    }

    /// Targets with a cached connection, oldest insertion first.
    pub(crate) fn cached_targets(&self) -> Vec<Address> {
        self.recents.iter().cloned().collect()
    }

    /// Writes `parts` to `target`, opening (and caching) a connection if needed.
    ///
    /// A connection whose write fails is dropped from the pool so the next delivery
    /// reconnects.
    #[instrument(skip(self, target, parts), fields(peer = %target), level = "debug")]
    pub(crate) async fn deliver<P: AsRef<[u8]>>(
        &mut self,
        target: &Address,
        parts: &[P],
    ) -> Result<(), HexameterError> {
        if self.closed {
            return Err(HexameterError::ConnectionClosed);
        }

        if self.capacity == 0 {
            let mut connection = Connection::open(target).await?;
            let result = connection.write(parts).await;
            connection.close().await;
            return result;
        }

        if !self.connections.contains_key(target) {
            // A failed connect leaves the cache as it was.
            let connection = Connection::open(target).await?;
            if self.recents.len() >= self.capacity {
                self.evict_oldest().await;
            }
            self.connections.insert(target.clone(), connection);
            self.recents.push_back(target.clone());
            debug!(peer = %target, cached = self.recents.len(), "connection cached");
        }

        let Some(connection) = self.connections.get_mut(target) else {
            return Err(HexameterError::ConnectionClosed);
        };
        let result = connection.write(parts).await;
        if result.is_err() {
            self.remove(target).await;
        }
        result
    }

    async fn evict_oldest(&mut self) {
        if let Some(oldest) = self.recents.pop_front() {
            debug!(peer = %oldest, "evicting oldest connection");
            if let Some(connection) = self.connections.remove(&oldest) {
                connection.close().await;
            }
        }
    }

    async fn remove(&mut self, target: &Address) {
        self.recents.retain(|cached| cached != target);
        if let Some(connection) = self.connections.remove(target) {
            connection.close().await;
        }
    }

    /// Closes every cached connection and refuses further deliveries.
    pub(crate) async fn close_all(&mut self) {
        self.closed = true;
        self.recents.clear();
        let connections: Vec<Connection> = self.connections.drain().map(|(_, c)| c).collect();
        join_all(connections.into_iter().map(Connection::close)).await;
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    async fn peer() -> (TcpListener, Address) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, Address::new("127.0.0.1", port))
    }

    #[tokio::test]
    async fn test_reuses_cached_connection() {
        let (listener, target) = peer().await;
        let mut pool = ConnectionPool::new(2);

        pool.deliver(&target, &[b"one".to_vec()]).await.unwrap();
        let (_first, _) = listener.accept().await.unwrap();
        pool.deliver(&target, &[b"two".to_vec()]).await.unwrap();

        assert_eq!(pool.cached_targets(), vec![target]);
        let second =
            tokio::time::timeout(std::time::Duration::from_millis(100), listener.accept()).await;
        assert!(second.is_err(), "a cached target must not be reconnected");
    }

    #[tokio::test]
    async fn test_eviction_follows_insertion_order() {
        let (_a_listener, a) = peer().await;
        let (_b_listener, b) = peer().await;
        let (_c_listener, c) = peer().await;
        let mut pool = ConnectionPool::new(2);

        pool.deliver(&a, &[b"x".to_vec()]).await.unwrap();
        pool.deliver(&b, &[b"x".to_vec()]).await.unwrap();
        // Reusing `a` does not protect it from eviction.
        pool.deliver(&a, &[b"x".to_vec()]).await.unwrap();
        pool.deliver(&c, &[b"x".to_vec()]).await.unwrap();

        assert_eq!(pool.cached_targets(), vec![b.clone(), c.clone()]);

        pool.deliver(&a, &[b"x".to_vec()]).await.unwrap();
        assert_eq!(pool.cached_targets(), vec![c, a]);
    }

    #[tokio::test]
    async fn test_zero_capacity_caches_nothing() {
        let (_listener, target) = peer().await;
        let mut pool = ConnectionPool::new(0);

        pool.deliver(&target, &[b"x".to_vec()]).await.unwrap();
        assert!(pool.cached_targets().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_target_is_not_cached() {
        let (listener, target) = peer().await;
        drop(listener);
        let mut pool = ConnectionPool::new(2);

        assert!(pool.deliver(&target, &[b"x".to_vec()]).await.is_err());
        assert!(pool.cached_targets().is_empty());
    }

    #[tokio::test]
    async fn test_failed_connect_keeps_full_cache() {
        let (_listener, cached) = peer().await;
        let (gone, unreachable) = peer().await;
        drop(gone);
        let mut pool = ConnectionPool::new(1);

        pool.deliver(&cached, &[b"x".to_vec()]).await.unwrap();
        assert!(pool.deliver(&unreachable, &[b"x".to_vec()]).await.is_err());
        assert_eq!(pool.cached_targets(), vec![cached.clone()]);
        pool.deliver(&cached, &[b"y".to_vec()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_pool_refuses_delivery() {
        let (_listener, target) = peer().await;
        let mut pool = ConnectionPool::new(2);
        pool.deliver(&target, &[b"x".to_vec()]).await.unwrap();

        pool.close_all().await;
        assert!(pool.cached_targets().is_empty());
        assert!(matches!(
            pool.deliver(&target, &[b"x".to_vec()]).await,
            Err(HexameterError::ConnectionClosed)
        ));
    }
}
