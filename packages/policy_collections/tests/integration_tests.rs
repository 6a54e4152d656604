//! Integration tests for `policy_collections` exercising the public API end to end.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::rc::Rc;

use policy_collections::{CopyWith, DynArray, Error, FnPolicy, FreeWith, LinkedList, Stack};

/// Counts calls to the copy and free hooks of a policy.
#[derive(Debug, Default)]
struct HookCounters {
    copies: Cell<usize>,
    frees: Cell<usize>,
}

fn counting_policy(
    counters: &Rc<HookCounters>,
) -> FnPolicy<impl Fn(&String) -> String, impl Fn(String)> {
    let copy_counters = Rc::clone(counters);
    let free_counters = Rc::clone(counters);

    FnPolicy::new(
        move |value: &String| {
            copy_counters.copies.set(copy_counters.copies.get() + 1);
            value.clone()
        },
        move |_: String| {
            free_counters.frees.set(free_counters.frees.get() + 1);
        },
    )
}

#[test]
fn array_append_scenario() {
    let mut array = DynArray::<i32>::new();

    for value in [1, 2, 3] {
        array.append(&value).unwrap();
    }

    assert_eq!(array.len(), 3);
    assert_eq!(array.capacity(), 4);
    assert_eq!(array.as_slice(), [1, 2, 3]);
}

#[test]
fn array_insert_splices_run_scenario() {
    let mut array = DynArray::new();
    for value in 0..6_u16 {
        array.append(&value).unwrap();
    }

    array.insert(2, [20, 21, 22]).unwrap();

    assert_eq!(array.as_slice(), [0, 1, 20, 21, 22, 2, 3, 4, 5]);
    assert_eq!(array.capacity(), 9);
}

#[test]
fn array_holds_large_elements() {
    let mut array = DynArray::new();
    let big = [7_u64; 32];

    array.append(&big).unwrap();
    array.append(&[9; 32]).unwrap();

    assert_eq!(array.element_size(), 256);
    assert_eq!(array.get(array.len() - 1), Some(&[9; 32]));
    assert_eq!(array.pop_back().unwrap(), Some([9; 32]));
    assert_eq!(array.as_slice(), [big]);
}

#[test]
fn array_grows_and_shrinks_through_append_and_pop() {
    let mut array = DynArray::new();

    for value in 0..10 {
        array.append(&value).unwrap();
    }

    assert_eq!(array.len(), 10);
    assert_eq!(array.capacity(), 16);
    assert_eq!(array.as_slice(), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);

    let mut popped = Vec::new();
    while let Some(value) = array.pop_back().unwrap() {
        popped.push(value);
    }

    assert_eq!(popped, [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
    assert!(array.is_empty());
    // 16 -> 8 at length 3, 8 -> 4 at length 1, 4 -> 2 at length 0.
    assert_eq!(array.capacity(), 2);
}

#[test]
fn array_capacity_shrinks_below_quarter_occupancy() {
    let mut array = DynArray::new();
    for value in 0..16 {
        array.append(&value).unwrap();
    }
    assert_eq!(array.capacity(), 16);

    // Pop down to 3 elements: the 13th pop leaves 3 < 16 / 4.
    for _ in 0..13 {
        array.pop_back().unwrap();
    }

    assert_eq!(array.len(), 3);
    assert_eq!(array.capacity(), 8);
    assert_eq!(array.as_slice(), [0, 1, 2]);
}

#[test]
fn array_set_releases_old_and_copies_new() {
    let counters = Rc::new(HookCounters::default());
    let mut array = DynArray::with_policy(counting_policy(&counters));

    array.append(&"a".to_string()).unwrap();
    array.append(&"b".to_string()).unwrap();
    assert_eq!(counters.copies.get(), 2);

    array.set(1, &"c".to_string());

    assert_eq!(counters.copies.get(), 3);
    assert_eq!(counters.frees.get(), 1);
    assert_eq!(array[1], "c");

    drop(array);

    assert_eq!(counters.frees.get(), 3);
}

#[test]
fn array_insert_and_resize_compose() {
    let mut array = DynArray::<u32>::new();
    array.resize(3).unwrap();
    assert_eq!(array.as_slice(), [0, 0, 0]);

    array.insert(1, [7, 8]).unwrap();
    assert_eq!(array.as_slice(), [0, 7, 8, 0, 0]);
    assert_eq!(array.capacity(), 5);

    array.resize(2).unwrap();
    assert_eq!(array.as_slice(), [0, 7]);
    assert_eq!(array.capacity(), 5);

    array.resize(0).unwrap();
    assert!(array.is_empty());
    assert_eq!(array.capacity(), 0);
}

#[test]
fn array_reports_impossible_capacity_without_changing() {
    let mut array = DynArray::<u64>::new();
    array.append(&1).unwrap();

    let error = array.reserve_capacity(usize::MAX).unwrap_err();

    assert!(error.is_allocation_failure());
    assert!(matches!(error, Error::CapacityOverflow { .. }));
    assert_eq!(array.as_slice(), [1]);
    assert_eq!(array.capacity(), 1);
}

#[test]
fn list_prepend_find_and_remove_scenario() {
    let mut list = LinkedList::new();

    for value in 0..10 {
        list.prepend(&value).unwrap();
    }

    assert_eq!(
        list.iter().copied().collect::<Vec<_>>(),
        [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]
    );

    let five = list.find(&5, Ord::cmp).expect("5 was inserted");
    assert_eq!(list.get(five), Some(&5));
    assert!(list.find(&10, Ord::cmp).is_none());

    list.remove(five);
    assert_eq!(list.len(), 9);
    assert!(list.find(&5, Ord::cmp).is_none());
}

#[test]
fn list_compare_after_reverse() {
    let mut forward = LinkedList::new();
    let mut last = None;
    for value in [5, 3, 8, 1] {
        last = Some(forward.append(last, &value).unwrap());
    }

    let mut backward = LinkedList::new();
    for value in [5, 3, 8, 1] {
        backward.prepend(&value).unwrap();
    }

    assert_eq!(forward.compare(&backward, Ord::cmp), Ordering::Less);

    backward.reverse();

    assert_eq!(forward.compare(&backward, Ord::cmp), Ordering::Equal);
}

#[test]
fn list_operations_balance_copies_and_frees() {
    let counters = Rc::new(HookCounters::default());

    {
        let mut list = LinkedList::with_policy(counting_policy(&counters));

        let head = list.prepend(&"b".to_string()).unwrap();
        list.insert(Some(head), &"a".to_string()).unwrap();
        let tail = list.append(Some(head), &"d".to_string()).unwrap();
        list.insert(Some(tail), &"c".to_string()).unwrap();

        assert_eq!(
            list.iter().map(String::as_str).collect::<Vec<_>>(),
            ["a", "b", "c", "d"]
        );

        let b = list.find(&"b".to_string(), Ord::cmp).unwrap();
        list.remove_range(b, Some(tail));

        assert_eq!(counters.frees.get(), 2);
        assert_eq!(
            list.iter().map(String::as_str).collect::<Vec<_>>(),
            ["a", "d"]
        );
    }

    assert_eq!(counters.copies.get(), 4);
    assert_eq!(counters.frees.get(), 4);
}

#[test]
fn stack_push_pop_scenario() {
    let mut stack = Stack::new();

    for value in 0..10 {
        stack.push(&value).unwrap();
    }
    assert_eq!(stack.head(), Some(&9));

    for _ in 0..3 {
        stack.pop();
    }

    assert_eq!(stack.head(), Some(&6));
    assert_eq!(stack.len(), 7);
}

#[test]
fn stack_of_strings_frees_each_exactly_once() {
    const COUNT: usize = 8;

    let counters = Rc::new(HookCounters::default());
    let mut stack = Stack::with_policy(counting_policy(&counters));

    for index in 0..COUNT {
        stack.push(&format!("item {index}")).unwrap();
    }
    assert_eq!(counters.copies.get(), COUNT);

    let mut popped_order = Vec::new();
    while let Some(top) = stack.head() {
        popped_order.push(top.clone());
        stack.pop();
    }

    let expected = (0..COUNT)
        .rev()
        .map(|index| format!("item {index}"))
        .collect::<Vec<_>>();

    assert_eq!(popped_order, expected);
    assert_eq!(counters.frees.get(), COUNT);

    drop(stack);

    assert_eq!(counters.frees.get(), COUNT);
}

#[test]
fn stack_releases_remaining_elements_on_drop() {
    let released = Rc::new(RefCell::new(Vec::new()));

    {
        let released = Rc::clone(&released);
        let mut stack = Stack::with_policy(FreeWith::new(move |value: u8| {
            released.borrow_mut().push(value);
        }));

        for value in 1..=3 {
            stack.push(&value).unwrap();
        }
    }

    assert_eq!(*released.borrow(), [3, 2, 1]);
}

#[test]
fn containers_share_a_policy_type() {
    let offset = 100;
    let policy = CopyWith::new(move |value: &i32| value + offset);

    let mut array = DynArray::with_policy(policy);
    let mut list = LinkedList::with_policy(policy);
    let mut stack = Stack::with_policy(policy);

    array.append(&1).unwrap();
    list.prepend(&2).unwrap();
    stack.push(&3).unwrap();

    assert_eq!(array.as_slice(), [101]);
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), [102]);
    assert_eq!(stack.head(), Some(&103));
}

#[test]
fn array_elements_can_move_into_list() {
    let mut array = DynArray::new();
    for word in ["one", "two", "three"] {
        array.append(&word.to_string()).unwrap();
    }

    let mut list = LinkedList::new();
    let mut last = None;
    for word in &array {
        last = Some(list.append(last, word).unwrap());
    }

    assert_eq!(list.len(), array.len());
    assert!(list.iter().eq(array.iter()));
}
