use cube::{
    heap::{CollectionKind, GcConfig, Generation, Heap, ObjectRef},
    interpreter::{context::BufferedContext, InterpreterConfig, TreeWalkInterpreter},
    object::{Class, Environment, HeapObject, Instance, List},
    parser::Parser,
    value::Value,
};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

fn test_heap() -> Heap {
    Heap::new(
        GcConfig::default()
            .with_promotion_age(2)
            .with_major_every(100),
    )
}

fn list(heap: &mut Heap, elements: Vec<Value>) -> ObjectRef {
    heap.allocate(HeapObject::List(List { elements }))
}

#[test]
fn minor_collection_frees_unreachable_young_objects() {
    let mut heap = test_heap();
    let kept = list(&mut heap, vec![]);
    let garbage = list(&mut heap, vec![]);
    let child = list(&mut heap, vec![]);
    heap.push_element(kept, Value::Object(child));

    assert_eq!(heap.collect(&[kept]), CollectionKind::Minor);
    assert!(heap.contains(kept));
    assert!(heap.contains(child));
    assert!(!heap.contains(garbage));
    assert_eq!(heap.len(), 2);
    assert_eq!(heap.stats().objects_freed, 1);
}

#[test]
fn survivors_age_and_get_promoted() {
    let mut heap = test_heap();
    let object = list(&mut heap, vec![Value::Number(1.0)]);

    heap.collect_minor(&[object]);
    assert_eq!(heap.get_generation(object), Some(Generation::Young));
    assert_eq!(heap.get_age(object), Some(1));

    heap.collect_minor(&[object]);
    assert_eq!(heap.get_generation(object), Some(Generation::Old));
    assert_eq!(heap.stats().objects_promoted, 1);

    // Promotion keeps the handle valid
    let elements = heap.get_list(object).map(|l| l.elements.clone());
    assert_eq!(elements, Some(vec![Value::Number(1.0)]));
}

#[test]
fn old_objects_survive_minor_collections_without_roots() {
    let mut heap = test_heap();
    let object = list(&mut heap, vec![]);
    heap.collect_minor(&[object]);
    heap.collect_minor(&[object]);
    assert_eq!(heap.get_generation(object), Some(Generation::Old));

    heap.collect_minor(&[]);
    assert!(heap.contains(object));

    heap.collect_major(&[]);
    assert!(!heap.contains(object));
    assert!(heap.is_empty());
}

#[test]
fn write_barrier_keeps_young_children_of_old_objects_alive() {
    let mut heap = test_heap();
    let parent = list(&mut heap, vec![]);
    heap.collect_minor(&[parent]);
    heap.collect_minor(&[parent]);
    assert_eq!(heap.get_generation(parent), Some(Generation::Old));
    assert!(!heap.is_remembered(parent));

    let child = list(&mut heap, vec![]);
    heap.push_element(parent, Value::Object(child));
    assert!(heap.is_remembered(parent));

    // Only the remembered set points at the child
    heap.collect_minor(&[]);
    assert!(heap.contains(child));
    assert!(heap.is_remembered(parent));

    // Once the child is promoted the parent no longer needs remembering
    heap.collect_minor(&[]);
    assert_eq!(heap.get_generation(child), Some(Generation::Old));
    assert!(!heap.is_remembered(parent));
}

#[test]
fn overwritten_references_leave_the_remembered_set() {
    let mut heap = test_heap();
    let class = heap.allocate(HeapObject::Class(Class {
        name: "Point".into(),
        superclass: None,
        methods: HashMap::new(),
    }));
    let instance = heap.allocate(HeapObject::Instance(Instance::new(class)));
    heap.collect_minor(&[instance]);
    heap.collect_minor(&[instance]);

    let field = list(&mut heap, vec![]);
    heap.set_field(instance, "x", Value::Object(field));
    assert!(heap.is_remembered(instance));

    heap.set_field(instance, "x", Value::Number(2.0));
    heap.collect_minor(&[]);
    assert!(!heap.contains(field));
    assert!(!heap.is_remembered(instance));
}

#[test]
fn environments_are_traced_through_parents() {
    let mut heap = test_heap();
    let globals = heap.allocate(HeapObject::Environment(Environment::new(None)));
    let scope = heap.allocate(HeapObject::Environment(Environment::new(Some(globals))));
    let value = list(&mut heap, vec![]);
    assert!(heap.define(globals, "xs", Value::Object(value)));
    assert!(heap.assign(scope, "xs", Value::Object(value)));
    assert!(!heap.assign(scope, "missing", Value::None));
    assert_eq!(heap.lookup(scope, "xs"), Some(Value::Object(value)));

    heap.collect_major(&[scope]);
    assert!(heap.contains(globals));
    assert!(heap.contains(value));
}

#[test]
fn cycles_are_collected() {
    let mut heap = test_heap();
    let a = list(&mut heap, vec![]);
    let b = list(&mut heap, vec![Value::Object(a)]);
    heap.push_element(a, Value::Object(b));
    heap.push_element(a, Value::Object(a));

    heap.collect_major(&[a]);
    assert_eq!(heap.len(), 2);

    heap.collect_major(&[]);
    assert!(heap.is_empty());
    assert_eq!(heap.stats().bytes_allocated, 0);
}

#[test]
fn stale_handles_do_not_alias_reused_slots() {
    let mut heap = test_heap();
    let first = list(&mut heap, vec![]);
    heap.collect_major(&[]);
    let second = list(&mut heap, vec![Value::Bool(true)]);

    assert_eq!(first.index(), second.index());
    assert_ne!(first, second);
    assert!(heap.get(first).is_none());
    assert!(heap.get(second).is_some());
}

#[test]
fn major_collection_runs_after_enough_minors() {
    let mut heap = Heap::new(GcConfig::default().with_major_every(2));
    assert_eq!(heap.collect(&[]), CollectionKind::Minor);
    assert_eq!(heap.collect(&[]), CollectionKind::Minor);
    assert_eq!(heap.next_collection_kind(), CollectionKind::Major);
    assert_eq!(heap.collect(&[]), CollectionKind::Major);
    assert_eq!(heap.collect(&[]), CollectionKind::Minor);

    let stats = heap.stats();
    assert_eq!(stats.minor_collections, 3);
    assert_eq!(stats.major_collections, 1);
}

#[test]
fn old_threshold_forces_a_major_collection() {
    let mut heap = Heap::new(
        GcConfig::default()
            .with_promotion_age(1)
            .with_old_threshold(2)
            .with_major_every(100),
    );
    let roots: Vec<ObjectRef> = (0..2).map(|_| list(&mut heap, vec![])).collect();
    assert_eq!(heap.collect(&roots), CollectionKind::Minor);
    assert_eq!(heap.stats().old_objects, 2);
    assert_eq!(heap.collect(&roots), CollectionKind::Major);
}

#[test]
fn should_collect_follows_the_young_threshold() {
    let mut heap = Heap::new(GcConfig::default().with_young_threshold(3));
    assert_eq!(heap.get_config().young_threshold, 3);
    list(&mut heap, vec![]);
    list(&mut heap, vec![]);
    assert!(!heap.should_collect());
    list(&mut heap, vec![]);
    assert!(heap.should_collect());
    heap.collect(&[]);
    assert!(!heap.should_collect());
}

fn small_heap_interpreter() -> TreeWalkInterpreter<BufferedContext> {
    let gc = GcConfig::default()
        .with_young_threshold(16)
        .with_old_threshold(128)
        .with_promotion_age(2)
        .with_major_every(4);
    TreeWalkInterpreter::new(BufferedContext::new(), InterpreterConfig::default().with_gc(gc))
}

#[test]
fn transient_closures_do_not_stay_resident() {
    let mut interpreter = small_heap_interpreter();
    interpreter.collect_all();
    let baseline = interpreter.heap().len();

    let source = "fun loop() { var i = 0; while (i < 10000) { var f = fun() { return i; }; i = i + 1; } }\n\
                  loop();";
    let program = Parser::new(source).parse().expect("valid program");
    interpreter.run(&program).expect("loop runs");

    let stats = interpreter.heap_stats();
    assert!(stats.minor_collections > 0);
    assert!(stats.objects_promoted > 0);

    interpreter.collect_all();
    // Only the `loop` function itself is new
    assert_eq!(interpreter.heap().len(), baseline + 1);

    let (_, stats) = interpreter.shutdown();
    assert_eq!(stats.young_objects + stats.old_objects, 0);
    assert_eq!(stats.bytes_allocated, 0);
}

#[test]
fn globals_survive_collections_between_runs() {
    let mut interpreter = small_heap_interpreter();
    let setup = "var xs = [];\nvar i = 0;\nwhile (i < 100) { push(xs, [i]); i = i + 1; }";
    let program = Parser::new(setup).parse().expect("valid program");
    interpreter.run(&program).expect("setup runs");

    for _ in 0..5 {
        interpreter.collect_garbage();
    }
    interpreter.collect_all();

    let check = "print(len(xs));\nprint(xs[99]);";
    let program = Parser::new(check).parse().expect("valid program");
    interpreter.run(&program).expect("globals are still alive");
    assert_eq!(interpreter.get_context().get_data(), "100\n[99]\n");

    let Some(Value::Object(xs)) = interpreter.get_global("xs") else {
        panic!("xs is a list");
    };
    assert_eq!(interpreter.heap().get_generation(xs), Some(Generation::Old));
}

// Property-based tests

#[derive(Debug, Clone)]
struct Graph {
    size: usize,
    edges: Vec<(usize, usize)>,
    roots: Vec<usize>,
    minors: usize,
}

fn graph_strategy() -> impl Strategy<Value = Graph> {
    (1usize..40).prop_flat_map(|size| {
        (
            prop::collection::vec((0..size, 0..size), 0..80),
            prop::collection::vec(0..size, 0..5),
            0usize..5,
        )
            .prop_map(move |(edges, roots, minors)| Graph {
                size,
                edges,
                roots,
                minors,
            })
    })
}

fn reachable(roots: &[usize], edges: &[(usize, usize)]) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut pending = roots.to_vec();
    while let Some(node) = pending.pop() {
        if seen.insert(node) {
            pending.extend(
                edges
                    .iter()
                    .filter(|(from, _)| *from == node)
                    .map(|(_, to)| *to),
            );
        }
    }
    seen
}

proptest! {
    #[test]
    fn collections_keep_exactly_the_reachable_objects(graph in graph_strategy()) {
        let mut heap = test_heap();
        let nodes: Vec<ObjectRef> = (0..graph.size).map(|_| list(&mut heap, vec![])).collect();
        let roots: Vec<ObjectRef> = graph.roots.iter().map(|&i| nodes[i]).collect();
        let mut added = Vec::with_capacity(graph.edges.len());

        // Edges are added half before and half after the minors so some point from old to young
        let (early, late) = graph.edges.split_at(graph.edges.len() / 2);
        for &(from, to) in early {
            heap.push_element(nodes[from], Value::Object(nodes[to]));
            added.push((from, to));
        }
        for _ in 0..graph.minors {
            heap.collect_minor(&roots);
        }
        for &(from, to) in late {
            if heap.contains(nodes[from]) && heap.contains(nodes[to]) {
                heap.push_element(nodes[from], Value::Object(nodes[to]));
                added.push((from, to));
            }
        }
        let live = reachable(&graph.roots, &added);
        heap.collect_minor(&roots);
        for &index in live.iter() {
            prop_assert!(heap.contains(nodes[index]));
        }

        heap.collect_major(&roots);
        for (index, node) in nodes.iter().enumerate() {
            prop_assert_eq!(heap.contains(*node), live.contains(&index));
        }
        prop_assert_eq!(heap.len(), live.len());
    }
}
