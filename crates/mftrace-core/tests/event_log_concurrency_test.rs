//! Log integrity under concurrent recorders.

use std::sync::Arc;
use std::thread;

use mftrace_core::event::HEADER;
use mftrace_core::logger::write_header;
use mftrace_core::{AllocationEvent, EventKind, EventLog};

const THREADS: usize = 8;
const EVENTS_PER_THREAD: usize = 500;

fn well_formed(line: &str) -> bool {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 5 {
        return false;
    }
    let size_ok = match fields[1] {
        "FREE" => fields[3].is_empty(),
        "ALLOC" | "CALLOC" | "REALLOC" => fields[3].parse::<usize>().is_ok(),
        _ => return false,
    };
    size_ok
        && fields[0].parse::<i64>().is_ok()
        && fields[2].starts_with("0x")
        && fields[4].parse::<i32>().is_ok()
}

#[test]
fn concurrent_records_never_tear_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    write_header(&path).unwrap();

    let log = Arc::new(EventLog::new());
    assert!(log.open_append(&path));

    let mut handles = Vec::new();
    for t in 0..THREADS {
        let log = Arc::clone(&log);
        handles.push(thread::spawn(move || {
            for i in 0..EVENTS_PER_THREAD {
                let kind = match i % 4 {
                    0 => EventKind::Alloc,
                    1 => EventKind::Free,
                    2 => EventKind::Calloc,
                    _ => EventKind::Realloc,
                };
                let size = if kind == EventKind::Free {
                    None
                } else {
                    Some(i)
                };
                log.record(&AllocationEvent {
                    ts_ns: i as i64,
                    kind,
                    ptr: (t << 32) | i,
                    size,
                    tid: t as i32,
                });
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 1 + THREADS * EVENTS_PER_THREAD);
    assert_eq!(lines[0], HEADER);
    assert_eq!(
        lines.iter().filter(|l| **l == HEADER).count(),
        1,
        "header must appear exactly once"
    );

    let mut per_thread = vec![0usize; THREADS];
    for line in &lines[1..] {
        assert!(well_formed(line), "torn or malformed line: {line:?}");
        let tid: usize = line.rsplit(',').next().unwrap().parse().unwrap();
        per_thread[tid] += 1;
    }
    for (tid, count) in per_thread.iter().enumerate() {
        assert_eq!(*count, EVENTS_PER_THREAD, "thread {tid} lost lines");
    }
}

#[test]
fn exactly_one_line_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    write_header(&path).unwrap();

    let log = EventLog::new();
    assert!(log.open_append(&path));

    for i in 0..100usize {
        log.record(&AllocationEvent {
            ts_ns: i as i64,
            kind: EventKind::Alloc,
            ptr: 0x1000 + i,
            size: Some(64),
            tid: 1,
        });
        log.record(&AllocationEvent {
            ts_ns: i as i64,
            kind: EventKind::Free,
            ptr: 0x1000 + i,
            size: None,
            tid: 1,
        });
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 1 + 200);

    // Timestamps within this single writer are non-decreasing.
    let stamps: Vec<i64> = contents
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap().parse().unwrap())
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn unwritable_destination_degrades_to_noop() {
    let log = EventLog::new();
    assert!(!log.open_append(std::path::Path::new("/nonexistent/dir/trace.csv")));

    // Recording after a failed open must neither panic nor create output.
    for i in 0..100usize {
        log.record(&AllocationEvent {
            ts_ns: i as i64,
            kind: EventKind::Alloc,
            ptr: i,
            size: Some(8),
            tid: 1,
        });
    }
    assert!(!log.is_ready());
}
