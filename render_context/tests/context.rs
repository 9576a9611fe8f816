use render_context::{create_key, Context};
use std::rc::Rc;

#[test]
fn get_walks_the_parent_chain() {
    let outer = create_key::<i32>("outer");
    let inner = create_key::<i32>("inner");

    let root = Context::new();
    root.set(&outer, 1);

    let child = root.fork();
    child.set(&inner, 2);
    let grandchild = child.fork();

    assert_eq!(grandchild.get(&outer).as_deref(), Some(&1));
    assert_eq!(grandchild.get(&inner).as_deref(), Some(&2));
}

#[test]
fn child_writes_shadow_without_overwriting() {
    let key = create_key::<&'static str>("value");

    let root = Context::new();
    root.set(&key, "root");

    let child = root.fork();
    child.set(&key, "child");

    assert_eq!(child.get(&key).as_deref(), Some(&"child"));
    assert_eq!(root.get(&key).as_deref(), Some(&"root"));
}

#[test]
fn sibling_forks_are_isolated() {
    let key = create_key::<u32>("n");

    let root = Context::new();
    let left = root.fork();
    let right = root.fork();
    left.set(&key, 7);

    assert_eq!(left.get(&key).as_deref(), Some(&7));
    assert_eq!(right.get(&key), None);
    assert_eq!(root.get(&key), None);
}

#[test]
fn defaults_apply_only_on_miss() {
    let key = create_key::<usize>("limit").with_default(32);

    let ctx = Context::new();
    assert_eq!(ctx.get(&key).as_deref(), Some(&32));

    ctx.set(&key, 8);
    assert_eq!(ctx.get(&key).as_deref(), Some(&8));

    // the default is still visible through a fresh context
    assert_eq!(Context::new().get(&key).as_deref(), Some(&32));
}

#[test]
fn keys_are_compared_by_identity() {
    let a = create_key::<i32>("same-name");
    let b = create_key::<i32>("same-name");
    assert_ne!(a, b);
    assert_eq!(a, a.clone());

    let ctx = Context::new();
    ctx.set(&a, 1);
    assert_eq!(ctx.get(&b), None);
}

#[test]
fn modified_flag_tracks_writes_to_the_current_frame() {
    let key = create_key::<i32>("k");

    let root = Context::new();
    let child = root.fork();
    assert!(!child.was_modified());

    // reading does not count as a modification
    let _ = child.get(&key);
    assert!(!child.was_modified());

    child.set(&key, 1);
    assert!(child.was_modified());
    assert!(!root.was_modified());
}

#[test]
fn values_are_shared_not_cloned() {
    let key = create_key::<Rc<String>>("shared");

    let root = Context::new();
    root.set(&key, Rc::new("payload".to_string()));
    let through_child = root.fork().get(&key).unwrap();
    let through_root = root.get(&key).unwrap();

    assert!(Rc::ptr_eq(&through_child, &through_root));
}
