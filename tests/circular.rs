use ferrous_context::{BeanDefinition, Container, ContainerOptions, DiError};
use std::sync::Arc;

struct A;
struct B;
struct C;

#[test]
fn test_self_circular_dependency() {
    struct SelfReferencing;

    let container = Container::new();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<SelfReferencing>()?;
            Ok(SelfReferencing)
        }))
        .unwrap();

    match container.get_by_name("selfReferencing") {
        Err(DiError::Circular(path)) => assert_eq!(path, vec!["selfReferencing", "selfReferencing"]),
        other => panic!("expected circular error, got {:?}", other),
    }
}

#[test]
fn test_three_way_cycle_names_every_bean() {
    let container = Container::new();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<B>()?;
            Ok(A)
        }))
        .unwrap();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<C>()?;
            Ok(B)
        }))
        .unwrap();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<A>()?;
            Ok(C)
        }))
        .unwrap();

    let err = container.get_by_name("a").unwrap_err();
    match &err {
        DiError::Circular(path) => assert_eq!(path, &vec!["a", "b", "c", "a"]),
        other => panic!("expected circular error, got {:?}", other),
    }
    assert_eq!(err.to_string(), "Circular dependency: a -> b -> c -> a");

    // Entering the cycle anywhere reports it starting from that bean
    match container.get_by_name("b") {
        Err(DiError::Circular(path)) => assert_eq!(path, vec!["b", "c", "a", "b"]),
        other => panic!("expected circular error, got {:?}", other),
    }
    match container.get_by_name("c") {
        Err(DiError::Circular(path)) => assert_eq!(path, vec!["c", "a", "b", "c"]),
        other => panic!("expected circular error, got {:?}", other),
    }

    // Nothing was half-built and the creation stack unwound
    assert!(container.get_by_name("a").is_err());
    assert!(container.contains_by_name("b"));
}

#[test]
fn test_initialize_reports_cycle() {
    let container = Container::new();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<B>()?;
            Ok(A)
        }))
        .unwrap();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<A>()?;
            Ok(B)
        }))
        .unwrap();

    assert!(matches!(container.initialize(), Err(DiError::Circular(_))));
}

#[test]
fn test_diamond_is_not_a_cycle() {
    struct Top {
        left: Arc<B>,
        right: Arc<C>,
    }

    let container = Container::new();
    container.register_type(BeanDefinition::new(|_| Ok(A))).unwrap();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<A>()?;
            Ok(B)
        }))
        .unwrap();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<A>()?;
            Ok(C)
        }))
        .unwrap();
    container
        .register_type(BeanDefinition::new(|ctx| Ok(Top { left: ctx.get::<B>()?, right: ctx.get::<C>()? })))
        .unwrap();

    let top = container.get_by_name_typed::<Top>("top").unwrap();
    assert!(Arc::ptr_eq(&top.left, &container.get_by_name_typed::<B>("b").unwrap()));
    assert!(Arc::ptr_eq(&top.right, &container.get_by_name_typed::<C>("c").unwrap()));
}

#[test]
fn test_separate_containers_do_not_interfere() {
    let outer = Container::new();
    let nested = Container::new();
    let inner = nested.clone();

    nested.register_type(BeanDefinition::new(|_| Ok(A))).unwrap();
    outer
        .register_type(BeanDefinition::new(move |_| {
            inner.get_by_name("a")?;
            Ok(A)
        }))
        .unwrap();

    assert!(outer.get_by_name("a").unwrap().is_some());
}

#[test]
fn test_depth_limit() {
    struct Level<const N: usize>;

    let container = Container::with_options(ContainerOptions::default().with_max_depth(2));
    container.register_type(BeanDefinition::new(|_| Ok(Level::<0>))).unwrap();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<Level<0>>()?;
            Ok(Level::<1>)
        }).named("one"))
        .unwrap();
    container
        .register_type(BeanDefinition::new(|ctx| {
            ctx.get::<Level<1>>()?;
            Ok(Level::<2>)
        }).named("two"))
        .unwrap();

    assert!(matches!(container.get_by_name("two"), Err(DiError::DepthExceeded(2))));
}
