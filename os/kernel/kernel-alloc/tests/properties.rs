use kernel_alloc::vmm::{MemoryError, MemoryManager};
use kernel_alloc::ReplacementPolicy;
use kernel_info::memory::{FRAME_COUNT, FRAME_SIZE, MAX_RESIDENT_SET};
use kernel_memory_addresses::FrameNumber;
use std::collections::BTreeSet;

fn resident_set(sizes: &[usize]) -> usize {
    let pages: usize = sizes.iter().map(|s| s.div_ceil(FRAME_SIZE)).sum();
    pages.min(MAX_RESIDENT_SET)
}

/// Owned frames of all processes are disjoint and cover exactly the occupied frames.
fn assert_frames_consistent(mm: &MemoryManager) {
    let mut owned = BTreeSet::new();
    for id in mm.processes() {
        for frame in mm.frames_of(id.as_str()).unwrap() {
            assert!(owned.insert(*frame), "{frame:?} owned twice");
            let owner = mm.frames().frame_at(frame.as_usize()).unwrap().owner();
            assert_eq!(owner.map(|o| &o.process), Some(id));
        }
    }
    let occupied: BTreeSet<_> = mm
        .frames()
        .frames()
        .filter(|f| f.is_occupied())
        .map(|f| f.number())
        .collect();
    assert_eq!(owned, occupied);
}

#[test]
fn free_count_tracks_resident_sets() {
    let layouts: [(&str, &[usize]); 6] = [
        ("a", &[5000, 3000]),
        ("b", &[100]),
        ("c", &[16 * 1024, 16 * 1024, 16 * 1024, 16 * 1024]),
        ("d", &[2048, 1, 1]),
        ("e", &[7 * 1024 + 1]),
        ("f", &[1024, 1024, 1024]),
    ];
    let mut mm = MemoryManager::new();
    let mut live = Vec::new();

    for (id, sizes) in layouts {
        mm.create_process(id, sizes).unwrap();
        live.push((id, sizes));
        let used: usize = live.iter().map(|(_, s)| resident_set(s)).sum();
        assert_eq!(mm.frames().unoccupied_count(), FRAME_COUNT - used);
        assert_frames_consistent(&mm);
    }

    for id in ["c", "a", "f"] {
        mm.destroy_process(id).unwrap();
        live.retain(|(l, _)| *l != id);
        let used: usize = live.iter().map(|(_, s)| resident_set(s)).sum();
        assert_eq!(mm.frames().unoccupied_count(), FRAME_COUNT - used);
        assert_frames_consistent(&mm);
    }
}

#[test]
fn failed_creation_changes_nothing() {
    let mut mm = MemoryManager::new();
    mm.create_process("A", &[5000, 3000]).unwrap();
    let frames = mm.snapshot_frames();
    let ids: Vec<_> = mm.processes().cloned().collect();

    let failures: [(&str, &[usize]); 6] = [
        ("has space", &[1024]),
        ("A", &[1024]),
        ("B", &[]),
        ("B", &[1, 2, 3, 4, 5]),
        ("B", &[1024, 16 * 1024 + 1]),
        ("B", &[0]),
    ];
    for (id, sizes) in failures {
        assert!(mm.create_process(id, sizes).is_err(), "{id} {sizes:?}");
        assert_eq!(mm.snapshot_frames(), frames);
        assert_eq!(mm.processes().cloned().collect::<Vec<_>>(), ids);
    }

    for i in 0..7 {
        mm.create_process(&format!("fill{i}"), &[8 * 1024]).unwrap();
    }
    let frames = mm.snapshot_frames();
    assert!(matches!(
        mm.create_process("late", &[1024]),
        Err(MemoryError::InsufficientMemory {
            requested: 1,
            available: 0
        })
    ));
    assert_eq!(mm.snapshot_frames(), frames);
    assert!(mm.process("late").is_none());
}

#[test]
fn initial_load_takes_first_pages_in_order() {
    let mut mm = MemoryManager::new();
    mm.create_process("P", &[3 * 1024, 2 * 1024, 6 * 1024]).unwrap();

    let snap = mm.snapshot_process("P").unwrap();
    let loaded: Vec<_> = snap
        .segments
        .iter()
        .flat_map(|s| s.pages.iter().map(move |p| (s.number.as_usize(), p)))
        .filter(|(_, p)| p.is_loaded())
        .map(|(s, p)| (s, p.number.as_usize(), p.frame.unwrap().as_usize()))
        .collect();
    assert_eq!(
        loaded,
        [
            (0, 0, 0),
            (0, 1, 1),
            (0, 2, 2),
            (1, 0, 3),
            (1, 1, 4),
            (2, 0, 5),
            (2, 1, 6),
            (2, 2, 7)
        ]
    );
}

#[test]
fn lru_fault_on_fresh_process_evicts_first_loaded_page() {
    // A fresh process has distinct stamps, so the first loaded page is the oldest.
    let mut mm = MemoryManager::new().with_policy(ReplacementPolicy::Lru);
    mm.create_process("T", &[4 * 1024, 6 * 1024]).unwrap();
    let kernel_vmem::Access::Fault(r) = mm.replace_page("T", 1, 5).unwrap() else {
        panic!("segment 1 page 5 should fault");
    };
    assert_eq!(r.victim.segment.as_usize(), 0);
    assert_eq!(r.victim.page.as_usize(), 0);
}

#[test]
fn hit_changes_no_frame() {
    let mut mm = MemoryManager::new();
    mm.create_process("H", &[4 * 1024]).unwrap();
    let frames = mm.snapshot_frames();
    for page in 0..4 {
        mm.replace_page("H", 0, page).unwrap();
    }
    assert_eq!(mm.snapshot_frames(), frames);
    assert_eq!(mm.stats().page_faults, 0);
    assert_eq!(mm.stats().total_requests, 4);
}

#[test]
fn recreation_reuses_the_same_frames() {
    let mut mm = MemoryManager::new();
    mm.create_process("A", &[2048]).unwrap();
    mm.create_process("B", &[3 * 1024]).unwrap();
    mm.create_process("C", &[1024]).unwrap();
    let before: Vec<FrameNumber> = mm.frames_of("B").unwrap().to_vec();

    mm.destroy_process("B").unwrap();
    mm.create_process("B2", &[3 * 1024]).unwrap();
    assert_eq!(mm.frames_of("B2").unwrap(), before.as_slice());
}

#[test]
fn destroying_unknown_process_fails() {
    let mut mm = MemoryManager::new();
    assert!(matches!(
        mm.destroy_process("ghost"),
        Err(MemoryError::NotFound(id)) if id == "ghost"
    ));
}
