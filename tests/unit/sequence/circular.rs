use super::*;

fn abc() -> CircularSequence<char> {
    CircularSequence::new(vec!['A', 'B', 'C']).unwrap()
}

#[test]
fn pairs_close_the_cycle() {
    let seq = abc();
    let pairs: Vec<_> = seq.ordered_pairs().map(|(a, b)| (*a, *b)).collect();
    assert_eq!(pairs, vec![('A', 'B'), ('B', 'C'), ('C', 'A')]);
}

#[test]
fn pair_count_equals_length_and_last_closes_to_first() {
    for len in 1..=6usize {
        let seq = CircularSequence::new((0..len).collect()).unwrap();
        for head in 0..len {
            let seq = seq.with_head(head).unwrap();
            let pairs: Vec<_> = seq.ordered_pairs().collect();
            assert_eq!(pairs.len(), len);
            assert_eq!(seq.ordered_pairs().len(), len);
            assert_eq!(pairs.last().unwrap().1, pairs.first().unwrap().0);
        }
    }
}

#[test]
fn single_item_yields_one_self_pair() {
    let seq = CircularSequence::new(vec!["only"]).unwrap();
    let pairs: Vec<_> = seq.ordered_pairs().collect();
    assert_eq!(pairs, vec![(&"only", &"only")]);
}

#[test]
fn pairs_are_restartable() {
    let seq = abc();
    let first: Vec<_> = seq.ordered_pairs().collect();
    let second: Vec<_> = seq.ordered_pairs().collect();
    assert_eq!(first, second);
    assert_eq!(seq.pair(2), Some((&'C', &'A')));
    assert_eq!(seq.pair(3), None);
}

#[test]
fn closed_read_starts_at_head() {
    let seq = abc().with_head(1).unwrap();
    let read: String = seq.iter_closed().collect();
    assert_eq!(read, "BCAB");
    assert_eq!(*seq.current(), 'B');
    assert_eq!(*seq.first(), 'A');
}

#[test]
fn rotation_returns_new_sequence_sharing_storage() {
    let seq = abc();
    let next = seq.next();
    assert_eq!(seq.head(), 0);
    assert_eq!(*next.current(), 'B');
    assert_eq!(*seq.prev().current(), 'C');
    assert_eq!(*next.next().next().current(), 'A');
    assert!(std::ptr::eq(seq.as_slice(), next.as_slice()));
}

#[test]
fn empty_and_out_of_range_are_rejected() {
    assert!(CircularSequence::<u8>::new(Vec::new()).is_err());
    assert!(abc().with_head(3).is_err());
}

#[test]
fn deserializes_from_list() {
    let seq: CircularSequence<String> = serde_json::from_str(r#"["a", "b"]"#).unwrap();
    assert_eq!(seq.len(), 2);
    assert!(serde_json::from_str::<CircularSequence<String>>("[]").is_err());
}
