// Unit tests for the replay buffer
//
// These tests verify snapshot ordering, the explicit no-data indicator,
// and the configurable overflow policies.

use meeting_capture::config::{OverflowPolicy, ReplayConfig};
use meeting_capture::ReplayBuffer;

fn config(max_bytes: usize, overflow: OverflowPolicy) -> ReplayConfig {
    ReplayConfig { max_bytes, overflow }
}

#[test]
fn test_snapshot_concatenates_in_append_order() {
    let mut buffer = ReplayBuffer::new(ReplayConfig::default());

    buffer.append(vec![1, 2, 3]);
    buffer.append(vec![4]);
    buffer.append(vec![5, 6]);

    assert_eq!(buffer.snapshot(), Some(vec![1, 2, 3, 4, 5, 6]));
}

#[test]
fn test_snapshot_without_any_append_is_no_data() {
    let buffer = ReplayBuffer::new(ReplayConfig::default());
    assert_eq!(buffer.snapshot(), None, "Empty buffer must be explicit no-data, not empty bytes");
}

#[test]
fn test_reset_discards_all_chunks() {
    let mut buffer = ReplayBuffer::new(ReplayConfig::default());

    buffer.append(vec![1, 2, 3]);
    assert!(buffer.snapshot().is_some());

    buffer.reset();
    assert_eq!(buffer.snapshot(), None);
    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.chunk_count(), 0);
}

#[test]
fn test_append_tracks_byte_and_chunk_counts() {
    let mut buffer = ReplayBuffer::new(ReplayConfig::default());

    buffer.append(vec![0; 100]);
    buffer.append(vec![0; 50]);

    assert_eq!(buffer.len(), 150);
    assert_eq!(buffer.chunk_count(), 2);
}

#[test]
fn test_drop_oldest_evicts_from_the_front() {
    let mut buffer = ReplayBuffer::new(config(6, OverflowPolicy::DropOldest));

    buffer.append(vec![1, 1, 1]);
    buffer.append(vec![2, 2, 2]);
    // Exceeds the 6 byte cap; the oldest chunk goes.
    buffer.append(vec![3, 3]);

    assert_eq!(buffer.snapshot(), Some(vec![2, 2, 2, 3, 3]));
    assert_eq!(buffer.len(), 5);
}

#[test]
fn test_reject_new_keeps_existing_chunks() {
    let mut buffer = ReplayBuffer::new(config(6, OverflowPolicy::RejectNew));

    buffer.append(vec![1, 1, 1]);
    buffer.append(vec![2, 2, 2]);
    // Would exceed the cap; rejected, existing audio untouched.
    buffer.append(vec![3, 3]);

    assert_eq!(buffer.snapshot(), Some(vec![1, 1, 1, 2, 2, 2]));
}

#[test]
fn test_chunk_larger_than_cap_is_discarded() {
    let mut buffer = ReplayBuffer::new(config(4, OverflowPolicy::DropOldest));

    buffer.append(vec![0; 10]);

    assert_eq!(buffer.snapshot(), None);
}

#[test]
fn test_reset_then_append_starts_fresh() {
    let mut buffer = ReplayBuffer::new(ReplayConfig::default());

    buffer.append(vec![9, 9]);
    buffer.reset();
    buffer.append(vec![1]);

    assert_eq!(buffer.snapshot(), Some(vec![1]));
}
