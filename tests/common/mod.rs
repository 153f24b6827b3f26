// Not every test binary uses every helper.
#![allow(dead_code)]

use avl_list::List;
use rand::seq::SliceRandom;
use rand::Rng;

/// `0..n` in a random order.
pub fn shuffled(n: i32) -> Vec<i32> {
    let mut items: Vec<i32> = (0..n).collect();
    items.shuffle(&mut rand::thread_rng());
    items
}

/// `len` random values in `-range..range`, with repetitions.
pub fn random_values(len: usize, range: i32) -> Vec<i32> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(-range..range)).collect()
}

/// Walks the list with the cursor, from first to last.
pub fn walk_forward<T: Clone>(list: &List<T>) -> Vec<T> {
    list.first();
    let mut items = vec![];
    let mut current = list.get();
    while let Some(item) = current {
        items.push(item);
        current = list.advance();
    }
    items
}

/// Walks the list with the cursor, from last to first.
pub fn walk_backward<T: Clone>(list: &List<T>) -> Vec<T> {
    list.last();
    let mut items = vec![];
    let mut current = list.get();
    while let Some(item) = current {
        items.push(item);
        current = list.rewind();
    }
    items
}

/// Returns how many nodes precede the cursor, leaving the cursor where it was.
pub fn cursor_index<T>(list: &List<T>) -> usize {
    let mut steps = 0;
    while list.prev() {
        steps += 1;
    }
    for _ in 0..steps {
        list.next();
    }
    steps
}
