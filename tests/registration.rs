use ferrous_context::{
    BeanDefinition, BeanMethods, Component, Configuration, Container, ContainerOptions, DiError,
    NamingStrategy,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct UserService;
struct OrderRepository;

#[test]
fn test_default_names_follow_naming_strategy() {
    let container = Container::new();
    container.register_type(BeanDefinition::new(|_| Ok(UserService))).unwrap();
    assert!(container.contains_by_name("userService"));

    let simple = Container::with_options(ContainerOptions::default().with_naming(NamingStrategy::SimpleName));
    simple.register_type(BeanDefinition::new(|_| Ok(UserService))).unwrap();
    assert!(simple.contains_by_name("UserService"));
    assert!(!simple.contains_by_name("userService"));
}

#[test]
fn test_explicit_name_overrides_default() {
    let container = Container::new();
    container
        .register_type(BeanDefinition::new(|_| Ok(OrderRepository)).named("orders"))
        .unwrap();

    assert!(container.contains_by_name("orders"));
    assert!(!container.contains_by_name("orderRepository"));
}

#[test]
fn test_duplicate_registration_keeps_first() {
    let container = Container::new();
    assert!(container.register_type(BeanDefinition::new(|_| Ok(1u32)).named("value")).unwrap());
    assert!(!container.register_type(BeanDefinition::new(|_| Ok(2u32)).named("value")).unwrap());

    assert_eq!(*container.get_by_name_typed::<u32>("value").unwrap(), 1);
}

#[test]
fn test_registration_after_creation_is_ignored() {
    let container = Container::new();
    container.register_type(BeanDefinition::new(|_| Ok(1u32)).named("value")).unwrap();
    container.get_by_name("value").unwrap();

    assert!(!container.register_type(BeanDefinition::new(|_| Ok(2u32)).named("value")).unwrap());
    assert_eq!(*container.get_by_name_typed::<u32>("value").unwrap(), 1);
}

#[test]
fn test_registration_does_not_construct() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();

    let container = Container::new();
    container
        .register_type(BeanDefinition::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(UserService)
        }))
        .unwrap();

    assert_eq!(built.load(Ordering::SeqCst), 0);
    container.get_by_name("userService").unwrap();
    container.get_by_name("userService").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_name_is_rejected() {
    let container = Container::new();
    let err = container
        .register_type(BeanDefinition::new(|_| Ok(UserService)).named(""))
        .unwrap_err();
    assert!(matches!(err, DiError::Registration { .. }));
}

struct Settings;

impl Configuration for Settings {
    fn bean_methods(methods: &mut BeanMethods<Self>) {
        methods.bean("port", |_: &Settings, _| Ok(8080u16));
    }
}

#[test]
fn test_register_types_handles_components_and_sources() {
    let container = Container::new();
    container
        .register_types(vec![
            Component::bean(BeanDefinition::new(|_| Ok(UserService))),
            Component::configuration(BeanDefinition::new(|_| Ok(Settings))),
        ])
        .unwrap();

    assert!(container.contains_by_name("userService"));
    assert!(container.contains_by_name("settings"));
    assert!(container.contains_by_name("port"));
}

#[test]
fn test_register_types_stops_at_first_failure() {
    let container = Container::new();
    let result = container.register_types(vec![
        Component::from(BeanDefinition::new(|_| Ok(UserService))),
        Component::from(BeanDefinition::new(|_| Ok(OrderRepository)).named("")),
        Component::from(BeanDefinition::new(|_| Ok(7u8)).named("seven")),
    ]);

    assert!(result.is_err());
    assert!(container.contains_by_name("userService"));
    assert!(!container.contains_by_name("seven"));
}

#[test]
fn test_instance_definition_hands_out_value() {
    let container = Container::new();
    container
        .register_type(BeanDefinition::instance("preset".to_string()).named("label"))
        .unwrap();

    assert_eq!(container.get_by_name_typed::<String>("label").unwrap().as_str(), "preset");
}
