#![no_main]
use std::collections::VecDeque;

use arbitrary::Arbitrary;
use chaindeque::{Deque, DequeError};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    Append(i32),
    AppendLeft(i32),
    Back,
    Clear,
    Front,
    Get(usize),
    Len,
    Pop,
    PopLeft,
    Render,
    Rotate(isize),
    Set(usize, i32),
}

#[derive(Arbitrary, Debug)]
struct Input {
    capacity: u8,
    ops: Vec<Op>,
}

const MAX_LEN: usize = 1000000;

fuzz_target!(|input: Input| { fuzz(&input) });

/// Bounded eviction as the model sees it: drop from the end opposite the insert.
fn evict(v: &mut VecDeque<i32>, cap: usize, from_front: bool) {
    if v.len() > cap {
        if from_front {
            v.pop_front();
        } else {
            v.pop_back();
        }
    }
}

fn render(v: &VecDeque<i32>) -> String {
    let shown = if v.len() > 10 { 9 } else { v.len() };
    let mut parts: Vec<String> = v.iter().take(shown).map(|x| format!("{x:?}")).collect();
    if v.len() > 10 {
        parts.push("...".to_string());
    }
    format!("Deque{{{}}}", parts.join(", "))
}

fn fuzz(input: &Input) {
    let cap = usize::from(input.capacity.max(1));
    let (mut d1, mut d2) = (Deque::<i32>::new(), Deque::<i32>::bounded(cap).unwrap());
    let (mut v1, mut v2) = (VecDeque::<i32>::new(), VecDeque::<i32>::new());

    for op in &input.ops {
        match *op {
            Op::Append(i) => {
                if v1.len() < MAX_LEN {
                    d1.append(i);
                    v1.push_back(i);
                }
                d2.append(i);
                v2.push_back(i);
                evict(&mut v2, cap, true);
            }
            Op::AppendLeft(i) => {
                if v1.len() < MAX_LEN {
                    d1.append_left(i);
                    v1.push_front(i);
                }
                d2.append_left(i);
                v2.push_front(i);
                evict(&mut v2, cap, false);
            }
            Op::Back => {
                assert_eq!(d1.back(), v1.back());
                assert_eq!(d2.back(), v2.back());
            }
            Op::Clear => {
                d1.clear();
                v1.clear();
                d2.clear();
                v2.clear();
            }
            Op::Front => {
                assert_eq!(d1.front(), v1.front());
                assert_eq!(d2.front(), v2.front());
            }
            Op::Get(i) => {
                assert_eq!(d1.get(i).ok(), v1.get(i));
                assert_eq!(d2.get(i).ok(), v2.get(i));
                if !v1.is_empty() {
                    let i1 = i % v1.len();
                    assert_eq!(d1.get(i1).ok(), v1.get(i1));
                }
            }
            Op::Len => {
                assert_eq!(d1.len(), v1.len());
                assert_eq!(d2.len(), v2.len());
                assert!(d2.len() <= cap);
            }
            Op::Pop => {
                assert_eq!(d1.pop().ok(), v1.pop_back());
                assert_eq!(d2.pop().ok(), v2.pop_back());
            }
            Op::PopLeft => {
                assert_eq!(d1.pop_left().ok(), v1.pop_front());
                assert_eq!(d2.pop_left().ok(), v2.pop_front());
            }
            Op::Render => {
                assert_eq!(d1.to_string(), render(&v1));
                assert_eq!(d2.to_string(), render(&v2));
            }
            Op::Rotate(n) => {
                // keep the amount of work per op sane
                let n = n % 4096;
                d1.rotate(n);
                d2.rotate(n);
                for (d, v) in [(&d1, &mut v1), (&d2, &mut v2)] {
                    if !v.is_empty() {
                        let k = n.unsigned_abs() % v.len();
                        if n > 0 {
                            v.rotate_right(k);
                        } else {
                            v.rotate_left(k);
                        }
                    }
                    assert_eq!(d.len(), v.len());
                }
            }
            Op::Set(i, x) => {
                let res = d1.set(i, x);
                if i < v1.len() {
                    assert_eq!(res, Ok(()));
                    v1[i] = x;
                } else {
                    assert_eq!(res, Err(DequeError::IndexOutOfRange { index: i, len: v1.len() }));
                }
                if !v2.is_empty() {
                    let i2 = i % v2.len();
                    d2.set(i2, x).unwrap();
                    v2[i2] = x;
                }
            }
        }
    }

    assert!(d1.len() == v1.len() && (0..v1.len()).all(|i| d1.get(i) == Ok(&v1[i])));
    assert!(d2.len() == v2.len() && (0..v2.len()).all(|i| d2.get(i) == Ok(&v2[i])));
}
