use kernel_memory_addresses::{FrameNumber, PageRef};
use kernel_vmem::{PagingStore, ProcessId};
use log::info;

/// Paging store that reports every transfer through the `log` facade.
#[derive(Debug, Default)]
pub struct LoggingStore {
    reads: u64,
    writes: u64,
}

impl LoggingStore {
    #[must_use]
    pub const fn reads(&self) -> u64 {
        self.reads
    }

    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.writes
    }
}

impl PagingStore for LoggingStore {
    fn read_page(&mut self, process: &ProcessId, page: PageRef, frame: FrameNumber) {
        self.reads += 1;
        info!("read page {page} of {process} into frame {frame}");
    }

    fn write_page(&mut self, process: &ProcessId, page: PageRef, frame: FrameNumber) {
        self.writes += 1;
        info!("wrote page {page} of {process} out of frame {frame}");
    }
}
