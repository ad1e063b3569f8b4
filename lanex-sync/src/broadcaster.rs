use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lanex_timing::{high_precision_sleep, Clock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

/// First byte of every datagram.
pub const TIMESTAMP_TAG: u8 = 0x01;
/// Tag plus a big-endian `i64` of epoch milliseconds.
pub const PACKET_LEN: usize = 1 + std::mem::size_of::<i64>();

/// Millisecond sleep granularity caps the rate.
pub const MAX_RATE_HZ: u32 = 1000;

const SEND_TIMEOUT: Duration = Duration::from_millis(10);
const CLOSE_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastSettings {
    pub host: String,
    pub port: u16,
    /// Datagrams per second.
    pub rate_hz: u32,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            rate_hz: 20,
        }
    }
}

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("broadcast rate {0} Hz outside 1..={MAX_RATE_HZ}")]
    InvalidRate(u32),
    #[error("could not resolve {host}:{port}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("{0} resolved to no address")]
    NoAddress(String),
    #[error("UDP socket error: {0}")]
    Socket(#[from] io::Error),
    #[error("broadcast thread panicked")]
    ThreadPanicked,
}

pub fn encode_packet(timestamp_ms: i64) -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = TIMESTAMP_TAG;
    packet[1..].copy_from_slice(&timestamp_ms.to_be_bytes());
    packet
}

/// Inverse of [`encode_packet`]; `None` for anything else.
pub fn decode_packet(data: &[u8]) -> Option<i64> {
    match data {
        [TIMESTAMP_TAG, rest @ ..] => rest.try_into().ok().map(i64::from_be_bytes),
        _ => None,
    }
}

/// Periodic UDP sender of the current clock reading.
#[derive(Debug, Clone)]
pub struct TimestampBroadcaster {
    target: SocketAddr,
    period: Duration,
}

impl TimestampBroadcaster {
    pub fn new(settings: &BroadcastSettings) -> Result<Self, BroadcastError> {
        if !(1..=MAX_RATE_HZ).contains(&settings.rate_hz) {
            return Err(BroadcastError::InvalidRate(settings.rate_hz));
        }
        let endpoint = format!("{}:{}", settings.host, settings.port);
        let target = endpoint
            .to_socket_addrs()
            .map_err(|source| BroadcastError::Resolve {
                host: settings.host.clone(),
                port: settings.port,
                source,
            })?
            .next()
            .ok_or(BroadcastError::NoAddress(endpoint))?;

        Ok(Self {
            target,
            period: Duration::from_millis(1000 / u64::from(settings.rate_hz)),
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Binds the socket and starts the sender thread. Socket setup errors
    /// surface here; send errors end the thread and come back from
    /// [`BroadcasterHandle::join`].
    pub fn spawn<C>(self, clock: C) -> Result<BroadcasterHandle, BroadcastError>
    where
        C: Clock + 'static,
    {
        let bind_addr: SocketAddr = if self.target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_write_timeout(Some(SEND_TIMEOUT))?;
        info!("UDP broadcasting to {}", self.target);

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("timestamp-broadcast".into())
            .spawn(move || self.run(socket, clock, &flag))?;

        Ok(BroadcasterHandle {
            stop,
            thread: Some(thread),
        })
    }

    fn run<C: Clock>(
        &self,
        socket: UdpSocket,
        clock: C,
        stop: &AtomicBool,
    ) -> Result<u64, BroadcastError> {
        let mut sent = 0u64;
        let mut outcome = Ok(());
        while !stop.load(Ordering::Acquire) {
            if let Err(err) = socket.send_to(&encode_packet(clock.now_ms()), self.target) {
                error!("UDP error: {err}");
                outcome = Err(BroadcastError::Socket(err));
                break;
            }
            sent += 1;
            high_precision_sleep(self.period);
        }

        high_precision_sleep(CLOSE_GRACE);
        drop(socket);
        info!(packets = sent, "Connection to UDP interface closed");
        outcome.map(|()| sent)
    }
}

/// Owner of a running broadcaster thread. Dropping it stops the thread.
#[derive(Debug)]
pub struct BroadcasterHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<u64, BroadcastError>>>,
}

impl BroadcasterHandle {
    /// Asks the thread to exit after its current period.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Stops the thread and returns how many datagrams it sent.
    pub fn join(mut self) -> Result<u64, BroadcastError> {
        self.request_stop();
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| BroadcastError::ThreadPanicked)?,
            None => Ok(0),
        }
    }
}

impl Drop for BroadcasterHandle {
    fn drop(&mut self) {
        self.request_stop();
        if let Some(thread) = self.thread.take() {
            debug!("waiting for broadcast thread");
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanex_timing::ManualClock;

    #[test]
    fn packet_is_tag_then_big_endian_millis() {
        let packet = encode_packet(0x0102_0304_0506_0708);
        assert_eq!(packet, [0x01, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(decode_packet(&packet), Some(0x0102_0304_0506_0708));
    }

    #[test]
    fn foreign_datagrams_are_rejected() {
        assert_eq!(decode_packet(&[0x02, 0, 0, 0, 0, 0, 0, 0, 1]), None);
        assert_eq!(decode_packet(&[0x01, 0, 0]), None);
        assert_eq!(decode_packet(&[]), None);
    }

    #[test]
    fn rates_outside_one_to_a_thousand_hz_are_refused() {
        for rate_hz in [0, MAX_RATE_HZ + 1, 5_000] {
            let settings = BroadcastSettings {
                rate_hz,
                ..Default::default()
            };
            assert!(matches!(
                TimestampBroadcaster::new(&settings),
                Err(BroadcastError::InvalidRate(r)) if r == rate_hz
            ));
        }
        let fastest = BroadcastSettings {
            rate_hz: MAX_RATE_HZ,
            ..Default::default()
        };
        let broadcaster = TimestampBroadcaster::new(&fastest).unwrap();
        assert_eq!(broadcaster.period(), Duration::from_millis(1));
    }

    #[test]
    fn period_follows_rate() {
        let settings = BroadcastSettings {
            rate_hz: 50,
            ..Default::default()
        };
        let broadcaster = TimestampBroadcaster::new(&settings).unwrap();
        assert_eq!(broadcaster.period(), Duration::from_millis(20));
        assert_eq!(broadcaster.target().port(), 5001);
    }

    #[test]
    fn sends_clock_readings_until_stopped() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let settings = BroadcastSettings {
            host: "127.0.0.1".into(),
            port: receiver.local_addr().unwrap().port(),
            rate_hz: 100,
        };

        let clock = ManualClock::new(1_700_000_000_123);
        let handle = TimestampBroadcaster::new(&settings)
            .unwrap()
            .spawn(clock.clone())
            .unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(len, PACKET_LEN);
        assert_eq!(decode_packet(&buf[..len]), Some(1_700_000_000_123));

        let sent = handle.join().unwrap();
        assert!(sent >= 1);
    }
}
