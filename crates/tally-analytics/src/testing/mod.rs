mod memory;

pub use memory::MemoryStatsStore;
