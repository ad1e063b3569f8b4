//! Clock synchronisation for external recorders.
//!
//! A background thread sends the wall-clock time over UDP at a fixed rate so
//! that eye trackers and physiological recorders can align their streams with
//! the trial timestamps.

pub mod broadcaster;

pub use broadcaster::{
    decode_packet, encode_packet, BroadcastError, BroadcastSettings, BroadcasterHandle,
    TimestampBroadcaster, MAX_RATE_HZ, PACKET_LEN, TIMESTAMP_TAG,
};
