/// Number of buckets a freshly created index starts with
pub const INITIAL_CAPACITY: usize = 512;

/// Longest chain a bucket may hold before the table is grown
pub const MAX_COLLISION: usize = 20;

/// Multiplier applied to the bucket count on every rehash
pub const GROWTH_FACTOR: usize = 2;

/// Number of lines making up one address block
pub const LINES_PER_RECORD: usize = 3;

/// Longest input line kept, excluding the terminator
pub const MAX_LINE_LEN: usize = 49;

/// Multiplier of the rolling string hash
pub const HASH_MULTIPLIER: u64 = 31;
