use std::ops::ControlFlow;
use std::rc::Rc;

use rowframe::{
    greater_or_equal, less_than, row, Bounds, ColumnIndexer, Frame, FrameError, FrameResult,
    Key, KeyError, Row, SharedRow, Value,
};

fn ids(rows: &[SharedRow]) -> Vec<i32> {
    rows.iter()
        .filter_map(|row| match row.get("id") {
            Some(Value::Int(id)) => Some(*id),
            _ => None,
        })
        .collect()
}

fn numbered(count: i32) -> FrameResult<Frame> {
    let mut frame = Frame::new(ColumnIndexer::new(["id"]));
    for id in (0..count).rev() {
        frame.put(row! { "id" => id, "name" => format!("row-{}", id) })?;
    }
    Ok(frame)
}

#[test]
fn put_and_get_frame() -> FrameResult<()> {
    let mut frame = Frame::new(ColumnIndexer::new(["i1", "i2"]));
    assert!(frame.put(row! { "i1" => 1, "i2" => 1, "data" => "foo" })?.is_none());
    assert!(frame.put(row! { "i1" => 1, "i2" => 2, "data" => "bar" })?.is_none());

    let r1 = frame.get(&row! { "i1" => 1, "i2" => 1 })?.expect("row (1, 1)");
    assert_eq!(r1.get("data"), Some(&Value::from("foo")));
    let r2 = frame.get(&row! { "i1" => 1, "i2" => 2 })?.expect("row (1, 2)");
    assert_eq!(r2.get("data"), Some(&Value::from("bar")));
    assert!(frame.get(&row! { "i1" => 2, "i2" => 2 })?.is_none());
    assert_eq!(frame.len(), 2);
    Ok(())
}

#[test]
fn put_replaces_and_returns_previous() -> FrameResult<()> {
    let mut frame = Frame::new(ColumnIndexer::new(["id"]));
    frame.put(row! { "id" => 7, "v" => "old" })?;
    let previous = frame.put(row! { "id" => 7, "v" => "new" })?.expect("previous row");
    assert_eq!(previous.get("v"), Some(&Value::from("old")));

    let current = frame.get(&row! { "id" => 7 })?.expect("current row");
    assert_eq!(current.get("v"), Some(&Value::from("new")));
    assert_eq!(frame.len(), 1);
    Ok(())
}

#[test]
fn failed_put_leaves_frame_unchanged() -> FrameResult<()> {
    let mut frame = numbered(3)?;
    let err = frame.put(row! { "name" => "no id" }).unwrap_err();
    assert_eq!(err, FrameError::missing_column("id"));
    assert!(frame.put(row! { "id" => "text" }).is_err());
    assert_eq!(frame.len(), 3);
    assert_eq!(ids(&frame.range(&Bounds::all())?), vec![0, 1, 2]);
    Ok(())
}

#[test]
fn mismatched_probe_is_an_error_not_a_panic() -> FrameResult<()> {
    let mut frame = Frame::new(UncheckedIndexer);
    frame.put(row! { "a" => 1 })?;
    frame.put(row! { "a" => 2 })?;

    let err = frame.get(&row! { "a" => "one" }).unwrap_err();
    assert_eq!(
        err,
        FrameError::Key(KeyError::TypeMismatch {
            left: "str",
            right: "int"
        })
    );
    assert!(frame.put(row! { "a" => "one" }).is_err());
    assert!(frame.range(&greater_or_equal(row! { "a" => 'c' })).is_err());
    assert_eq!(frame.len(), 2);
    Ok(())
}

/// Indexes column `a` without type memory, so mismatched keys reach the tree.
#[derive(Debug)]
struct UncheckedIndexer;

impl rowframe::Indexer for UncheckedIndexer {
    fn index(&self, row: &Row) -> FrameResult<Key> {
        let value = row.get("a").ok_or_else(|| FrameError::missing_column("a"))?;
        Ok(Key::from_value(value)?)
    }
}

#[test]
fn pop_removes_the_row() -> FrameResult<()> {
    let mut frame = numbered(4)?;
    let popped = frame.pop(&row! { "id" => 2 })?.expect("row 2");
    assert_eq!(popped.get("name"), Some(&Value::from("row-2")));
    assert!(frame.pop(&row! { "id" => 2 })?.is_none());
    assert!(frame.get(&row! { "id" => 2 })?.is_none());
    assert_eq!(ids(&frame.range(&Bounds::all())?), vec![0, 1, 3]);
    Ok(())
}

#[test]
fn range_scans_in_ascending_order() -> FrameResult<()> {
    let frame = numbered(10)?;
    assert_eq!(ids(&frame.range(&Bounds::all())?), (0..10).collect::<Vec<_>>());
    assert_eq!(ids(&frame.range(&greater_or_equal(row! { "id" => 7 }))?), vec![7, 8, 9]);
    assert_eq!(ids(&frame.range(&less_than(row! { "id" => 3 }))?), vec![0, 1, 2]);

    let bounds = Bounds::all()
        .greater_or_equal(row! { "id" => 3 })
        .less_than(row! { "id" => 6 });
    assert_eq!(ids(&frame.range(&bounds)?), vec![3, 4, 5]);

    let inverted = Bounds::all()
        .greater_or_equal(row! { "id" => 6 })
        .less_than(row! { "id" => 3 });
    assert!(frame.range(&inverted)?.is_empty());

    let between = greater_or_equal(row! { "id" => -5 }).less_than(row! { "id" => 2 });
    assert_eq!(ids(&frame.range(&between)?), vec![0, 1]);
    Ok(())
}

#[test]
fn composite_ranges_follow_prefix_order() -> FrameResult<()> {
    let mut frame = Frame::new(ColumnIndexer::new(["a", "b"]));
    for (a, b) in [("y", "b"), ("x", "b"), ("x", "a"), ("y", "a")] {
        frame.put(row! { "a" => a, "b" => b })?;
    }
    let keys: Vec<Key> = frame.iter().map(|(key, _)| key.clone()).collect();
    let expected: Vec<Key> = [("x", "a"), ("x", "b"), ("y", "a"), ("y", "b")]
        .iter()
        .map(|(a, b)| Key::Composite(vec![Key::Str(a.to_string()), Key::Str(b.to_string())]))
        .collect();
    assert_eq!(keys, expected);
    Ok(())
}

#[test]
fn for_range_stops_and_fails() -> FrameResult<()> {
    let frame = numbered(6)?;

    let firsts: Vec<i32> = frame.for_range(&Bounds::all(), |row| {
        Ok::<_, FrameError>(match row.get("id") {
            Some(Value::Int(id)) if *id < 3 => ControlFlow::Continue(*id),
            _ => ControlFlow::Break(()),
        })
    })?;
    assert_eq!(firsts, vec![0, 1, 2]);

    let failed = frame.for_range(&Bounds::all(), |row| match row.get("id") {
        Some(Value::Int(4)) => Err(FrameError::missing_column("boom")),
        _ => Ok(ControlFlow::Continue(())),
    });
    assert_eq!(failed, Err(FrameError::missing_column("boom")));
    Ok(())
}

#[test]
fn pop_range_removes_selected_rows() -> FrameResult<()> {
    let mut frame = numbered(8)?;
    let popped = frame.pop_range(&greater_or_equal(row! { "id" => 2 }).less_than(row! { "id" => 5 }))?;
    assert_eq!(ids(&popped), vec![2, 3, 4]);
    assert_eq!(ids(&frame.range(&Bounds::all())?), vec![0, 1, 5, 6, 7]);

    let rest = frame.pop_range(&Bounds::all())?;
    assert_eq!(ids(&rest), vec![0, 1, 5, 6, 7]);
    assert!(frame.is_empty());
    Ok(())
}

#[test]
fn pop_range_abort_keeps_unvisited_rows() -> FrameResult<()> {
    let mut frame = numbered(6)?;
    let result = frame.pop_range_with(&Bounds::all(), |row| match row.get("id") {
        Some(Value::Int(3)) => Err(FrameError::missing_column("stop")),
        _ => Ok(ControlFlow::Continue(())),
    });
    assert_eq!(result, Err(FrameError::missing_column("stop")));
    assert_eq!(ids(&frame.range(&Bounds::all())?), vec![3, 4, 5]);

    let taken = frame.pop_range_with(&Bounds::all(), |row| {
        Ok::<_, FrameError>(match row.get("id") {
            Some(Value::Int(5)) => ControlFlow::Break(()),
            _ => ControlFlow::Continue(Rc::clone(row)),
        })
    })?;
    assert_eq!(ids(&taken), vec![3, 4]);
    assert_eq!(ids(&frame.range(&Bounds::all())?), vec![5]);
    Ok(())
}

#[test]
fn with_indexer_shares_row_payloads() -> FrameResult<()> {
    let mut source = Frame::new(ColumnIndexer::new(["id"]));
    for (id, name) in [(1, "c"), (2, "a"), (3, "b")] {
        source.put(row! { "id" => id, "name" => name })?;
    }
    let mut by_name = source.with_indexer(ColumnIndexer::new(["name"]))?;

    let names: Vec<_> = by_name
        .range(&Bounds::all())?
        .iter()
        .map(|row| row.get("name").cloned())
        .collect();
    assert_eq!(names, vec![Some("a".into()), Some("b".into()), Some("c".into())]);

    let original = source.get(&row! { "id" => 2 })?.expect("source row");
    let derived = by_name.get(&row! { "name" => "a" })?.expect("derived row");
    assert!(Rc::ptr_eq(&original, &derived));

    by_name.pop(&row! { "name" => "a" })?;
    assert_eq!(by_name.len(), 2);
    assert_eq!(source.len(), 3);
    Ok(())
}

#[test]
fn with_indexer_collisions_keep_the_later_row() -> FrameResult<()> {
    let mut source = Frame::new(ColumnIndexer::new(["id"]));
    source.put(row! { "id" => 1, "team" => "red" })?;
    source.put(row! { "id" => 2, "team" => "red" })?;
    let by_team = source.with_indexer(ColumnIndexer::new(["team"]))?;
    assert_eq!(by_team.len(), 1);
    assert_eq!(ids(&by_team.range(&Bounds::all())?), vec![2]);
    Ok(())
}

#[test]
fn with_indexer_fails_on_unindexable_rows() -> FrameResult<()> {
    let frame = numbered(3)?;
    let err = frame.with_indexer(ColumnIndexer::new(["missing"])).unwrap_err();
    assert_eq!(err, FrameError::missing_column("missing"));
    Ok(())
}

#[test]
fn updates_go_through_copy_on_write() -> FrameResult<()> {
    let mut frame = numbered(2)?;
    let derived = frame.with_indexer(ColumnIndexer::new(["id"]))?;

    let mut shared = frame.get(&row! { "id" => 1 })?.expect("row 1");
    Rc::make_mut(&mut shared).insert("name", "renamed");
    frame.put_shared(shared)?;

    let updated = frame.get(&row! { "id" => 1 })?.expect("updated row");
    assert_eq!(updated.get("name"), Some(&Value::from("renamed")));
    let untouched = derived.get(&row! { "id" => 1 })?.expect("derived row");
    assert_eq!(untouched.get("name"), Some(&Value::from("row-1")));
    Ok(())
}

#[test]
fn zero_column_indexer_holds_one_row() -> FrameResult<()> {
    let mut frame = Frame::new(ColumnIndexer::new(Vec::<String>::new()));
    frame.put(row! { "v" => 1 })?;
    let previous = frame.put(row! { "v" => 2 })?;
    assert!(previous.is_some());
    assert_eq!(frame.len(), 1);
    assert_eq!(frame.key_of(&Row::new())?, Key::NoKey);
    assert!(frame.get_by_key(&Key::NoKey)?.is_some());
    Ok(())
}
