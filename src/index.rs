/// Chained hash index over address records, used for duplicate detection.
use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::record::Record;
use tracing::{debug, info, warn};

/// A rust representation of the index.
///
/// Records live in an arena of nodes. Each bucket is a singly linked chain of
/// node positions, newest first. Growing the table relinks the existing nodes
/// into a larger bucket array; records never move.
#[derive(Debug)]
pub struct Index {
    /// Every stored record, in insertion order
    nodes: Vec<Node>,

    /// Heads of the chains.
    ///
    /// A record reachable from bucket `b` always satisfies
    /// `record.hash(buckets.len()) == b`.
    buckets: Vec<Bucket>,

    config: IndexConfig,

    /// Number of completed rehashes
    rehashes: usize,
}

#[derive(Debug)]
struct Node {
    record: Record,

    /// The next node of the same chain
    next: Option<usize>,
}

/// Rust representation of a bucket
#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    first: Option<usize>,

    /// The number of nodes in the chain
    len: usize,
}

/// Result of a successful [`Index::insert`]
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,

    /// An equal record is already stored. The rejected record is handed back.
    Duplicate(Record),
}

/// Walks one chain, yielding node positions
struct Chain<'a> {
    nodes: &'a [Node],
    cur: Option<usize>,
}

impl Iterator for Chain<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let id = self.cur?;
        self.cur = self.nodes[id].next;
        Some(id)
    }
}

impl Index {
    /// Creates an empty index with `config.initial_capacity` buckets.
    pub fn create(config: IndexConfig) -> Result<Self, IndexError> {
        config.validate()?;
        debug!(
            "creating index with {} buckets, collision threshold {}",
            config.initial_capacity, config.max_collision
        );

        Ok(Self {
            nodes: Vec::new(),
            buckets: empty_table(config.initial_capacity)?,
            config,
            rehashes: 0,
        })
    }

    /// Stores `record` unless an equal one is already present.
    ///
    /// A chain growing past the collision threshold grows the table by the
    /// configured factor before this returns. If the larger table cannot be
    /// allocated the index keeps its current size and the insert still
    /// succeeds.
    pub fn insert(&mut self, record: Record) -> Result<InsertOutcome, IndexError> {
        let slot = record.hash(self.buckets.len());

        if self.find_in(slot, &record).is_some() {
            debug!("duplicate of {:?} in bucket {}", record.surname(), slot);
            return Ok(InsertOutcome::Duplicate(record));
        }

        self.nodes.try_reserve(1)?;
        let id = self.nodes.len();
        let next = self.buckets[slot].first;
        self.nodes.push(Node { record, next });

        let bucket = &mut self.buckets[slot];
        bucket.first = Some(id);
        bucket.len += 1;
        debug!("inserted record {} into bucket {} ({} in chain)", id, slot, bucket.len);

        if bucket.len > self.config.max_collision {
            self.rehash();
        }

        Ok(InsertOutcome::Inserted)
    }

    /// Finds the stored record equal to `probe`.
    pub fn lookup(&self, probe: &Record) -> Option<&Record> {
        let slot = probe.hash(self.buckets.len());
        self.find_in(slot, probe).map(|id| &self.nodes[id].record)
    }

    /// Tears the index down, releasing every record before the bucket array.
    pub fn destroy(self) {
        let Index { nodes, buckets, .. } = self;
        debug!(
            "destroying index of {} records in {} buckets",
            nodes.len(),
            buckets.len()
        );
        drop(nodes);
        drop(buckets);
    }

    /// The number of stored records
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The current number of buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn rehash_count(&self) -> usize {
        self.rehashes
    }

    /// The length of bucket `slot`'s chain, `None` past the end of the table
    pub fn chain_len(&self, slot: usize) -> Option<usize> {
        self.buckets.get(slot).map(|bucket| bucket.len)
    }

    /// The records of bucket `slot`, newest first
    pub fn chain(&self, slot: usize) -> impl Iterator<Item = &Record> + '_ {
        let first = self.buckets.get(slot).and_then(|bucket| bucket.first);
        self.walk(first).map(move |id| &self.nodes[id].record)
    }

    /// All stored records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.nodes.iter().map(|node| &node.record)
    }

    /// All stored records in [`Record::compare`] order
    pub fn sorted(&self) -> Vec<&Record> {
        let mut records: Vec<&Record> = self.iter().collect();
        records.sort();
        records
    }

    fn walk(&self, first: Option<usize>) -> Chain<'_> {
        Chain {
            nodes: &self.nodes,
            cur: first,
        }
    }

    fn find_in(&self, slot: usize, probe: &Record) -> Option<usize> {
        self.walk(self.buckets[slot].first)
            .find(|&id| self.nodes[id].record == *probe)
    }

    /// Moves every node into a table `growth_factor` times larger.
    ///
    /// Nodes are relinked without duplicate checks and without re-entering
    /// the growth trigger, so one call costs one pass over the records.
    fn rehash(&mut self) {
        let old_size = self.buckets.len();
        let Some(new_size) = old_size.checked_mul(self.config.growth_factor) else {
            warn!("index cannot grow past {} buckets", old_size);
            return;
        };

        let mut table = match empty_table(new_size) {
            Ok(table) => table,
            Err(_) => {
                warn!(
                    "could not allocate {} buckets, keeping {}",
                    new_size, old_size
                );
                return;
            }
        };

        info!("rehashing index from {} to {} buckets", old_size, new_size);

        // Arena order is insertion order, so pushing onto the heads keeps
        // every chain newest first
        for (id, node) in self.nodes.iter_mut().enumerate() {
            let bucket = &mut table[node.record.hash(new_size)];
            node.next = bucket.first;
            bucket.first = Some(id);
            bucket.len += 1;
        }

        self.buckets = table;
        self.rehashes += 1;
    }
}

fn empty_table(size: usize) -> Result<Vec<Bucket>, IndexError> {
    let mut table = Vec::new();
    table.try_reserve_exact(size)?;
    table.resize(size, Bucket::default());
    Ok(table)
}
