//! Basic usage example for the `policy_collections` containers.
//!
//! This example fills each container, shows how capacity and order change, and uses a
//! custom free policy to observe when elements are released.

use std::cell::Cell;

use policy_collections::{DynArray, FreeWith, LinkedList, Stack};

fn main() {
    // A growable array doubles its capacity when full and halves it when mostly empty.
    let mut array = DynArray::new();

    for value in 0..10_u32 {
        array.append(&value).unwrap();
        println!(
            "Appended {value}: length {}, capacity {}",
            array.len(),
            array.capacity()
        );
    }

    array.insert(5, [100, 101]).unwrap();
    println!("After insert: {array:?}");

    while array.len() > 2 {
        array.pop_back().unwrap();
    }
    println!(
        "After popping: {array:?} with capacity {}",
        array.capacity()
    );

    // A linked list hands out node IDs that can be used to navigate and edit it.
    let mut list = LinkedList::new();
    let mut last = None;

    for word in ["red", "green", "blue"] {
        last = Some(list.append(last, &word.to_string()).unwrap());
    }

    let green = list.find(&"green".to_string(), Ord::cmp).unwrap();
    list.insert_after(green, &"yellow".to_string()).unwrap();
    println!("List: {list:?}");

    list.reverse();
    println!("Reversed: {list:?}");

    // A stack with a free hook reports every element it releases.
    let released = Cell::new(0);
    let mut stack = Stack::with_policy(FreeWith::new(|value: u32| {
        println!("Releasing {value}");
        released.set(released.get() + 1);
    }));

    for value in 1..=5 {
        stack.push(&value).unwrap();
    }

    stack.pop();
    stack.pop();
    println!("Top of stack: {:?}", stack.head());

    drop(stack);
    println!("Released {} elements in total", released.get());
}
