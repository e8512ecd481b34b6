use super::*;
use crate::style::primitives::StyleVariant;

fn set(names: &[&str]) -> StyleSet {
    StyleSet::new(names.iter().map(|n| StyleVariant::named(*n)).collect())
}

#[test]
fn builds_once_per_key() {
    let mut cache = StyleCache::new();
    let mut builds = 0;

    let a = cache.resolve(&Value::from("bar"), |key| {
        builds += 1;
        assert_eq!(key, "bar");
        set(&["bar"])
    });
    let b = cache.resolve(&Value::from("bar"), |_| {
        builds += 1;
        set(&["other"])
    });

    assert_eq!(builds, 1);
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(b.borrow().names(), vec!["bar"]);
    assert_eq!(cache.len(), 1);
}

#[test]
fn keys_use_their_string_form() {
    let mut cache = StyleCache::new();
    let a = cache.resolve(&Value::Number(3.0), |_| set(&["a"]));
    let b = cache.resolve(&Value::from("3"), |_| set(&["b"]));
    assert!(Rc::ptr_eq(&a, &b));

    cache.resolve(&Value::Undefined, |key| {
        assert_eq!(key, "undefined");
        set(&[])
    });
    assert!(cache.contains(&Value::Undefined));
    assert!(!cache.contains(&Value::Null));
    assert_eq!(cache.len(), 2);
}

#[test]
fn mutations_are_shared_between_holders() {
    let mut cache = StyleCache::new();
    let first = cache.resolve(&Value::from("k"), |_| set(&["poi"]));
    first.borrow_mut().variants_mut()[0].z_index = Some(9.0);
    let again = cache.resolve(&Value::from("k"), |_| set(&[]));
    assert_eq!(again.borrow().variants()[0].z_index, Some(9.0));
}

#[test]
fn starts_empty() {
    let cache = StyleCache::new();
    assert!(cache.is_empty());
    assert!(!cache.contains(&Value::from("DEFAULT")));
}
