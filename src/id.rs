use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use rand::Rng;

static NEXT: AtomicU64 = AtomicU64::new(1);

/// Returns a record id unique for the lifetime of the process.
///
/// Ids combine a process-wide monotonic counter with a short random suffix,
/// so two records created in the same instant never collide the way
/// wall-clock ids can. Collision avoidance only, not cryptographic
/// uniqueness.
///
/// # Examples
///
/// ```
/// let a = lomo::next_record_id();
/// let b = lomo::next_record_id();
/// assert_ne!(a, b);
/// ```
pub fn next_record_id() -> String {
    let seq = NEXT.fetch_add(1, Ordering::Relaxed);
    let suffix: u16 = rand::thread_rng().r#gen();
    format!("{seq}-{suffix:04x}")
}

/// Human-readable creation timestamp captured when a record is saved.
///
/// Immutable thereafter; display only, never parsed back.
pub fn created_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
