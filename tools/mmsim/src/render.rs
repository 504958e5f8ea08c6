//! Text views of the manager's state.

use kernel_alloc::snapshot::{FrameSnapshot, ProcessSnapshot};
use kernel_info::memory::{
    FRAME_SIZE, MAX_RESIDENT_SET, MAX_SEGMENT_SIZE, MAX_SEGMENTS, MEMORY_SIZE,
};
use kernel_vmem::ReplacementPolicy;
use std::fmt;

const FRAMES_PER_ROW: usize = 8;
const LABEL_WIDTH: usize = 5;

/// The frame table as a grid of owner labels.
pub struct MemoryView<'a>(pub &'a [FrameSnapshot]);

impl fmt::Display for MemoryView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memory usage:")?;
        for row in self.0.chunks(FRAMES_PER_ROW) {
            let (Some(first), Some(last)) = (row.first(), row.last()) else {
                continue;
            };
            let range = format!("{}-{}:", first.number, last.number);
            write!(f, "\n{range:<7}|")?;
            for frame in row {
                let label: String = frame
                    .owner
                    .as_ref()
                    .map(|o| o.process.as_str().chars().take(LABEL_WIDTH).collect())
                    .unwrap_or_default();
                write!(f, " {label:<LABEL_WIDTH$} |")?;
            }
        }
        Ok(())
    }
}

/// Resident set, policy state and page tables of one process.
pub struct ProcessView<'a>(pub &'a ProcessSnapshot);

impl fmt::Display for ProcessView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = self.0;

        write!(f, "Resident set: [ ")?;
        for frame in &snap.frames {
            write!(f, "{frame} ")?;
        }
        writeln!(f, "]")?;

        match snap.policy {
            ReplacementPolicy::Fifo => {
                write!(f, "Replacement policy: FIFO, load order [ ")?;
                for page in &snap.load_order {
                    write!(f, "{page} ")?;
                }
            }
            ReplacementPolicy::Lru => {
                write!(f, "Replacement policy: LRU, least recent first [ ")?;
                for page in &snap.recency {
                    write!(f, "{page} ")?;
                }
            }
        }
        writeln!(f, "]")?;

        let rule = "-".repeat(66);
        for segment in &snap.segments {
            writeln!(f)?;
            writeln!(
                f,
                "Process {} segment {} (size {})",
                snap.id, segment.number, segment.size
            )?;
            writeln!(f, "{rule}")?;
            writeln!(
                f,
                "| {:>4} | {:<6} | {:>5} | {:<11} | {:>11} |",
                "Page", "Status", "Frame", "Frame start", "Last access"
            )?;
            writeln!(f, "{rule}")?;
            for page in &segment.pages {
                match (page.frame, page.frame_base(), page.last_access) {
                    (Some(frame), Some(base), Some(tick)) => writeln!(
                        f,
                        "| {:>4} | {:<6} | {:>5} | {:<11} | {:>11} |",
                        page.number.as_usize(),
                        "load",
                        frame,
                        base.to_string(),
                        tick
                    )?,
                    _ => writeln!(
                        f,
                        "| {:>4} | {:<6} | {:>5} | {:<11} | {:>11} |",
                        page.number.as_usize(),
                        "unload",
                        "",
                        "",
                        ""
                    )?,
                }
            }
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

pub fn banner(policy: ReplacementPolicy) -> String {
    format!(
        "Memory Management Simulator [version {version}]\n\
         \n\
         Memory size is {mem}K, page frame size is {frame}K, a process can have at most \
         {segs} segments of at most {seg}K each, and a resident set of at most {rss} pages.\n\
         Resident set replacement: local (victims come from the faulting process only)\n\
         Page eviction policies: FIFO, LRU (default for new processes: {policy})\n\
         Initial loading: segment 0 pages first, then segment 1, ... until the resident set is full\n\
         Placement: lowest free frames first\n",
        version = env!("CARGO_PKG_VERSION"),
        mem = MEMORY_SIZE / 1024,
        frame = FRAME_SIZE / 1024,
        segs = MAX_SEGMENTS,
        seg = MAX_SEGMENT_SIZE / 1024,
        rss = MAX_RESIDENT_SET,
    )
}

pub const HELP: &str = "\
create process <id> <size> [<size>...]   create a process with up to 4 segments
destroy process <id>                     destroy a process
show memory                              display frame usage
show process <id>                        display resident set, policy and page tables
show processes                           list live processes
address <id> <segment> <offset>          map a logical address to a physical address
page replace <id> <segment> <page>       access a page, replacing one if it is absent
policy fifo|lru                          set the policy for processes created from now on
stats                                    show request and page fault counts
help, h                                  show this help
quit, q                                  exit";
