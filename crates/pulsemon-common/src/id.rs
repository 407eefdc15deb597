use snowflake::SnowflakeIdBucket;
use std::sync::Mutex;

static ID_GENERATOR: Mutex<Option<SnowflakeIdBucket>> = Mutex::new(None);

/// Initialize the snowflake ID generator.
///
/// `machine_id` / `node_id`: 0-31. Call once at process start; records
/// created before `init` fall back to the (1, 1) bucket.
pub fn init(machine_id: i32, node_id: i32) {
    let mut gen = ID_GENERATOR.lock().unwrap();
    *gen = Some(SnowflakeIdBucket::new(machine_id, node_id));
}

/// Generate a snowflake ID as a decimal string.
///
/// Snowflake IDs embed a millisecond timestamp in the high bits, so IDs are
/// time-ordered and sample rows inherit a monotonically increasing primary key.
pub fn next_id() -> String {
    let mut gen = ID_GENERATOR.lock().unwrap();
    let bucket = gen.get_or_insert_with(|| SnowflakeIdBucket::new(1, 1));
    bucket.get_id().to_string()
}
