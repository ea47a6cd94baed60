// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::{ErrorKind, Filesystem, OpenMode, Session};

#[test]
fn test_write_close_reopen_read() {
    let mut fs = Filesystem::in_memory();
    _ = fs.mkdir("docs").unwrap();
    _ = fs.chdir("docs").unwrap();
    _ = fs.create("a.txt").unwrap();

    let h = fs.open("a.txt", OpenMode::Write).unwrap();
    _ = h.write(&mut fs, "hello", None).unwrap();
    assert!(fs.close("a.txt").unwrap());

    let h = fs.open("a.txt", OpenMode::Read).unwrap();
    assert_eq!(h.read(&fs, None, None).unwrap(), "hello");
    assert_eq!(h.path(), "/docs/a.txt");
}

#[test]
fn test_duplicate_create_keeps_one_block() {
    let mut fs = Filesystem::in_memory();
    _ = fs.create("x").unwrap();
    let err = fs.create("x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(fs.store().len(), 1);
    assert_eq!(fs.tree().root().len(), 1);
}

#[test]
fn test_move_within_targets_shortened_buffer() {
    let mut fs = Filesystem::in_memory();
    let h = fs.open("x", OpenMode::Write).unwrap();
    _ = h.write(&mut fs, "0123456789", None).unwrap();
    h.move_within(&mut fs, 2, 3, 0).unwrap();
    assert_eq!(h.read(&fs, None, None).unwrap(), "2340156789");
}

#[test]
fn test_truncate_never_pads() {
    let mut fs = Filesystem::in_memory();
    let h = fs.open("x", OpenMode::Write).unwrap();
    _ = h.write(&mut fs, "abcdef", None).unwrap();
    assert_eq!(h.truncate(&mut fs, 3).unwrap(), 3);
    assert_eq!(h.read(&fs, None, None).unwrap(), "abc");
    assert_eq!(h.truncate(&mut fs, 100).unwrap(), 3);
    assert_eq!(h.read(&fs, None, None).unwrap(), "abc");
}

#[test]
fn test_move_keeps_content_id() {
    let mut fs = Filesystem::in_memory();
    _ = fs.mkdir("docs").unwrap();
    _ = fs.chdir("docs").unwrap();
    let h = fs.open("a.txt", OpenMode::Write).unwrap();
    _ = h.write(&mut fs, "original", None).unwrap();
    let id = h.content_id().clone();

    let (from, to) = fs.move_entry("a.txt", "../b.txt").unwrap();
    assert_eq!(from, "/docs/a.txt");
    assert_eq!(to, "/b.txt");
    assert!(!fs.exists("a.txt"));

    let moved = fs.lookup("../b.txt").unwrap().as_file().unwrap();
    assert_eq!(moved.content_id, id);

    let r = fs.open("../b.txt", OpenMode::Read).unwrap();
    assert_eq!(r.read(&fs, None, None).unwrap(), "original");

    // the handle opened before the move still reaches the same block
    _ = h.write(&mut fs, "!", Some(8)).unwrap();
    assert_eq!(r.read(&fs, None, None).unwrap(), "original!");
}

#[test]
fn test_read_ranges() {
    let mut fs = Filesystem::in_memory();
    let h = fs.open("x", OpenMode::Write).unwrap();
    _ = h.write(&mut fs, "héllo wörld", None).unwrap();

    assert_eq!(h.read(&fs, Some(6), None).unwrap(), "wörld");
    assert_eq!(h.read(&fs, Some(1), Some(4)).unwrap(), "éllo");
    assert_eq!(h.read(&fs, Some(8), Some(100)).unwrap(), "rld");
    assert_eq!(h.read(&fs, Some(50), None).unwrap(), "");
    assert_eq!(h.read(&fs, Some(0), Some(0)).unwrap(), "");
    assert_eq!(h.read(&fs, Some(0), Some(-2)).unwrap(), "");
    assert_eq!(
        h.read(&fs, Some(-1), None).unwrap_err().kind(),
        ErrorKind::InvalidRange
    );
}

#[test]
fn test_write_at_overwrites_in_place() {
    let mut fs = Filesystem::in_memory();
    let h = fs.open("x", OpenMode::Write).unwrap();
    _ = h.write(&mut fs, "abcdef", None).unwrap();

    assert_eq!(h.write(&mut fs, "XY", Some(1)).unwrap(), 6);
    assert_eq!(h.read(&fs, None, None).unwrap(), "aXYdef");

    assert_eq!(h.write(&mut fs, "123", Some(5)).unwrap(), 8);
    assert_eq!(h.read(&fs, None, None).unwrap(), "aXYde123");

    // past the end clamps to an append
    assert_eq!(h.write(&mut fs, "!", Some(99)).unwrap(), 9);
    assert_eq!(h.read(&fs, None, None).unwrap(), "aXYde123!");

    assert_eq!(
        h.write(&mut fs, "?", Some(-1)).unwrap_err().kind(),
        ErrorKind::InvalidRange
    );
}

#[test]
fn test_append_mode() {
    let mut fs = Filesystem::in_memory();
    let h = fs.open("log", OpenMode::Append).unwrap();
    _ = h.write(&mut fs, "one", None).unwrap();
    _ = h.write(&mut fs, " two", None).unwrap();
    assert_eq!(h.read(&fs, None, None).unwrap(), "one two");

    // reopening never alters content
    let w = fs.open("log", OpenMode::Write).unwrap();
    assert_eq!(w.read(&fs, None, None).unwrap(), "one two");
}

#[test]
fn test_read_handle_rejects_mutation() {
    let mut fs = Filesystem::in_memory();
    _ = fs.create("x").unwrap();
    let h = fs.open("x", OpenMode::Read).unwrap();
    assert_eq!(h.write(&mut fs, "a", None).unwrap_err().kind(), ErrorKind::InvalidMode);
    assert_eq!(h.move_within(&mut fs, 0, 0, 0).unwrap_err().kind(), ErrorKind::InvalidMode);
    assert_eq!(h.truncate(&mut fs, 0).unwrap_err().kind(), ErrorKind::InvalidMode);
}

#[test]
fn test_move_within_rejects_bad_ranges() {
    let mut fs = Filesystem::in_memory();
    let h = fs.open("x", OpenMode::Write).unwrap();
    _ = h.write(&mut fs, "0123456789", None).unwrap();

    for (start, size, target) in [(-1, 1, 0), (0, -1, 0), (0, 1, -1), (8, 3, 0), (0, 3, 8)] {
        assert_eq!(
            h.move_within(&mut fs, start, size, target).unwrap_err().kind(),
            ErrorKind::InvalidRange,
            "{start} {size} {target}"
        );
    }
    // the last valid target lands the slice at the end
    h.move_within(&mut fs, 0, 3, 7).unwrap();
    assert_eq!(h.read(&fs, None, None).unwrap(), "3456789012");
    assert_eq!(
        h.truncate(&mut fs, -1).unwrap_err().kind(),
        ErrorKind::InvalidSize
    );
}

#[test]
fn test_handle_table_follows_moved_file() {
    let mut s = Session::new(Filesystem::in_memory());
    _ = s.open("a", "w");
    _ = s.write("a", "original", None);
    assert_eq!(s.move_entry("a", "b"), "Moved /a to /b");

    assert!(s.fs().handle("/a").is_none());
    assert_eq!(s.fs().handle("/b").unwrap().path(), "/b");

    // a new file at the vacated path has no handle until opened
    assert_eq!(s.create("a"), "Created file /a");
    assert_eq!(s.write("a", "CLOBBER", None), "Error: File not open: /a");
    assert_eq!(s.read("b", None, None), "original");

    _ = s.open("a", "w");
    _ = s.write("a", "fresh", None);
    assert_eq!(s.read("a", None, None), "fresh");
    assert_eq!(s.read("b", None, None), "original");
    assert_eq!(s.write("b", "!", Some(8)), "Wrote 1 character to /b (size 9 B)");
    assert_eq!(s.read("b", None, None), "original!");
}

#[test]
fn test_handle_table_follows_moved_directory() {
    let mut fs = Filesystem::in_memory();
    _ = fs.mkdir("/d").unwrap();
    _ = fs.mkdir("/d/sub").unwrap();
    let h = fs.open("/d/sub/f", OpenMode::Write).unwrap();
    _ = fs.open("/d2", OpenMode::Write).unwrap();

    _ = fs.move_entry("/d", "/e").unwrap();
    let mut keys: Vec<&str> = fs.open_handles().map(|h| h.path()).collect();
    keys.sort();
    assert_eq!(keys, vec!["/d2", "/e/sub/f"]);
    assert!(fs.handle("/d/sub/f").is_none());
    assert_eq!(fs.handle("/e/sub/f").unwrap().content_id(), h.content_id());

    // reopening under the old path now finds nothing to bind to
    assert_eq!(
        fs.open("/d/sub/f", OpenMode::Read).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert!(fs.close("/e/sub/f").unwrap());
}
