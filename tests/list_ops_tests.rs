//! List node behavior: index handling, shifting mutations, searches,
//! snapshot rewrites, and cell handles.

use serde_json::{json, Value};

use jsop::error::JsopError;
use jsop::node::ListNode;
use jsop::session::{Jsop, Session};

fn session_with(tmp: &tempfile::TempDir, value: Value) -> Session {
    let db = Jsop::new(tmp.path().join("list.jsop"));
    db.init(&value).unwrap();
    db.open().unwrap()
}

fn root_list(session: &Session) -> ListNode<'_> {
    session.root().unwrap().as_list().unwrap()
}

#[test]
fn get_and_put_normalise_negative_indices() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!(["a", "b", "c"]));
    let list = root_list(&session);

    assert_eq!(list.get(0).unwrap().export().unwrap(), json!("a"));
    assert_eq!(list.get(-1).unwrap().export().unwrap(), json!("c"));
    assert_eq!(list.get(-3).unwrap().export().unwrap(), json!("a"));
    assert!(matches!(list.get(3), Err(JsopError::OutOfRange { .. })));
    assert!(matches!(list.get(-4), Err(JsopError::OutOfRange { .. })));

    list.put(-2, &json!("B")).unwrap();
    assert_eq!(list.export().unwrap(), json!(["a", "B", "c"]));
    assert!(matches!(
        list.put(5, &json!("x")),
        Err(JsopError::OutOfRange { .. })
    ));
}

#[test]
fn put_replaces_a_nested_container() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([[1, 2], "keep"]));
    let list = root_list(&session);

    list.put(0, &json!("flat")).unwrap();
    assert_eq!(list.export().unwrap(), json!(["flat", "keep"]));
}

#[test]
fn insert_clamps_out_of_range_indices() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([0, 1, 2]));
    let list = root_list(&session);

    list.insert(99, &json!("end")).unwrap();
    list.insert(-99, &json!("start")).unwrap();
    list.insert(2, &json!("mid")).unwrap();
    list.insert(-2, &json!("neg")).unwrap();
    assert_eq!(
        list.export().unwrap(),
        json!(["start", 0, "mid", 1, "neg", 2, "end"])
    );
}

#[test]
fn pop_and_delete() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([1, 2, 3]));
    let list = root_list(&session);

    assert_eq!(list.pop().unwrap(), json!(3));
    list.delete(0).unwrap();
    assert_eq!(list.export().unwrap(), json!([2]));
    list.delete(-1).unwrap();
    assert!(matches!(list.pop(), Err(JsopError::EmptyContainer { .. })));
    assert!(matches!(list.delete(0), Err(JsopError::OutOfRange { .. })));
}

#[test]
fn remove_matches_deeply_and_only_once() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([1, [3, 4, 5], 2, [3, 4, 5]]));
    let list = root_list(&session);

    list.remove(&json!([3, 4, 5])).unwrap();
    assert_eq!(list.export().unwrap(), json!([1, 2, [3, 4, 5]]));
    assert!(matches!(
        list.remove(&json!("absent")),
        Err(JsopError::NotFound { .. })
    ));
}

#[test]
fn searches_use_deep_equality() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([2, [3, 4, 5], 3, [3, 4, 5], 3]));
    let list = root_list(&session);

    assert!(list.contains(&json!(2)).unwrap());
    assert!(list.contains(&json!([3, 4, 5])).unwrap());
    assert!(!list.contains(&json!([3, 4, 6])).unwrap());

    assert_eq!(list.index_of(&json!(3), 0, None).unwrap(), 2);
    assert_eq!(list.index_of(&json!(3), 3, None).unwrap(), 4);
    assert_eq!(list.index_of(&json!([3, 4, 5]), 0, None).unwrap(), 1);
    assert!(matches!(
        list.index_of(&json!(3), 0, Some(2)),
        Err(JsopError::NotFound { .. })
    ));

    assert_eq!(list.count(&json!(3)).unwrap(), 2);
    assert_eq!(list.count(&json!([3, 4, 5])).unwrap(), 2);
    assert_eq!(list.count(&json!(9)).unwrap(), 0);
}

#[test]
fn iteration_runs_both_ways() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([1, "two", [3]]));
    let list = root_list(&session);

    let forward: Vec<Value> = list
        .iter()
        .unwrap()
        .map(|item| item.unwrap().export().unwrap())
        .collect();
    assert_eq!(forward, vec![json!(1), json!("two"), json!([3])]);

    let backward: Vec<Value> = list
        .iter()
        .unwrap()
        .rev()
        .map(|item| item.unwrap().export().unwrap())
        .collect();
    assert_eq!(backward, vec![json!([3]), json!("two"), json!(1)]);
}

#[test]
fn extend_concat_and_repeat() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([1, 2]));
    let list = root_list(&session);

    list.extend([json!(3), json!([4])]).unwrap();
    assert_eq!(list.export().unwrap(), json!([1, 2, 3, [4]]));

    // Snapshot-producing combinations leave the stored list untouched.
    let combined = list.concat(&[json!(9)]).unwrap();
    assert_eq!(combined, json!([1, 2, 3, [4], 9]));
    let doubled = list.repeat(2).unwrap();
    assert_eq!(doubled, json!([1, 2, 3, [4], 1, 2, 3, [4]]));
    assert_eq!(list.export().unwrap(), json!([1, 2, 3, [4]]));

    // Extending a list with itself: snapshot first.
    let own = list.export().unwrap();
    list.extend(own.as_array().unwrap().iter().cloned()).unwrap();
    assert_eq!(list.len().unwrap(), 8);

    list.repeat_in_place(0).unwrap();
    assert_eq!(list.export().unwrap(), json!([]));
}

#[test]
fn repeat_in_place_multiplies_content() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([1, 2]));
    let list = root_list(&session);

    list.repeat_in_place(3).unwrap();
    assert_eq!(list.export().unwrap(), json!([1, 2, 1, 2, 1, 2]));
}

#[test]
fn sort_and_reverse_rewrite_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([3, 8, -1, 0, 3, 4, 3]));
    let list = root_list(&session);

    list.sort().unwrap();
    assert_eq!(list.export().unwrap(), json!([-1, 0, 3, 3, 3, 4, 8]));
    list.reverse().unwrap();
    assert_eq!(list.export().unwrap(), json!([8, 4, 3, 3, 3, 0, -1]));
}

#[test]
fn sort_orders_mixed_kinds_by_kind() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!(["b", 2, null, [1], true, "a", 1]));
    let list = root_list(&session);

    list.sort().unwrap();
    assert_eq!(
        list.export().unwrap(),
        json!([null, true, 1, 2, "a", "b", [1]])
    );
}

#[test]
fn cells_read_and_write_elements() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([1, "hello", [1, 2, 3]]));
    let list = root_list(&session);

    let values: Vec<Value> = list
        .cells()
        .unwrap()
        .map(|cell| cell.export().unwrap())
        .collect();
    assert_eq!(values, vec![json!(1), json!("hello"), json!([1, 2, 3])]);

    for (i, cell) in list.cells().unwrap().enumerate() {
        if i == 1 {
            cell.put(&json!("world")).unwrap();
        }
    }
    assert_eq!(list.export().unwrap(), json!([1, "world", [1, 2, 3]]));
}

#[test]
fn cell_removal_survives_earlier_removals() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([0, 1, 2, 3, 4]));
    let list = root_list(&session);

    // Remove two entries in one pass; the second cell still addresses
    // its element even though indices have conceptually shifted.
    for (i, cell) in list.cells().unwrap().enumerate() {
        if i == 1 || i == 3 {
            cell.remove().unwrap();
        }
    }
    assert_eq!(list.export().unwrap(), json!([0, 2, 4]));
    // Density is restored once the cells pass is over.
    assert_eq!(list.get(1).unwrap().export().unwrap(), json!(2));
    assert_eq!(list.get(-1).unwrap().export().unwrap(), json!(4));
    list.append(&json!(5)).unwrap();
    assert_eq!(list.export().unwrap(), json!([0, 2, 4, 5]));
}

#[test]
fn emptying_a_list_through_cells() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session_with(&tmp, json!([1, "hello", [1, 2, 3]]));
    let list = root_list(&session);

    for cell in list.cells().unwrap() {
        cell.remove().unwrap();
    }
    assert_eq!(list.export().unwrap(), json!([]));
    assert_eq!(list.len().unwrap(), 0);
}
