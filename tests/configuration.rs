use ferrous_context::{
    BeanDefinition, BeanMethods, Configuration, Container, DefinitionKind, DiError, FactoryMethod,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static POOLS_BUILT: AtomicUsize = AtomicUsize::new(0);

struct DataConfig {
    url: String,
}

struct Pool {
    url: String,
}

struct Repository {
    pool: Arc<Pool>,
}

impl Configuration for DataConfig {
    fn bean_methods(methods: &mut BeanMethods<Self>) {
        methods.bean("pool", |cfg: &DataConfig, _| {
            POOLS_BUILT.fetch_add(1, Ordering::SeqCst);
            Ok(Pool { url: cfg.url.clone() })
        });
        methods.add(
            FactoryMethod::new("repository", |_: &DataConfig, ctx| Ok(Repository { pool: ctx.get::<Pool>()? }))
                .named("userRepository"),
        );
    }
}

#[test]
fn test_factory_methods_become_lazy_beans() {
    let container = Container::new();
    container
        .register_factory_source(BeanDefinition::new(|_| Ok(DataConfig { url: "mem://users".to_string() })))
        .unwrap();

    let before = POOLS_BUILT.load(Ordering::SeqCst);
    assert!(container.contains_by_name("dataConfig"));
    assert!(container.contains_by_name("pool"));
    assert!(container.contains_by_name("userRepository"));
    assert!(!container.contains_by_name("repository"));
    assert!(container.contains_by_type::<Pool>());

    let repo = container.get_by_name_typed::<Repository>("userRepository").unwrap();
    assert_eq!(repo.pool.url, "mem://users");
    assert!(Arc::ptr_eq(&repo.pool, &container.get_by_name_typed::<Pool>("pool").unwrap()));
    assert_eq!(POOLS_BUILT.load(Ordering::SeqCst), before + 1);
}

#[test]
fn test_configuration_bean_is_live_after_registration() {
    let container = Container::new();
    container
        .register_factory_source(BeanDefinition::new(|_| Ok(DataConfig { url: String::new() })))
        .unwrap();

    let descriptors = container.descriptors();
    let config = descriptors.iter().find(|d| d.name == "dataConfig").unwrap();
    assert!(config.is_live());

    let pool = descriptors.iter().find(|d| d.name == "pool").unwrap();
    assert!(!pool.is_live());
    assert_eq!(pool.kind, DefinitionKind::Factory { owner: "dataConfig".to_string() });
    assert_eq!(pool.owner(), Some("dataConfig"));
}

#[test]
fn test_failed_source_leaves_nothing_registered() {
    let container = Container::new();
    let err = container
        .register_factory_source(BeanDefinition::<DataConfig>::new(|_| Err(anyhow::anyhow!("no config file"))))
        .unwrap_err();

    match err {
        DiError::Registration { name, type_name, .. } => {
            assert_eq!(name, "dataConfig");
            assert!(type_name.ends_with("DataConfig"));
        }
        other => panic!("expected Registration, got {:?}", other),
    }
    assert!(!container.contains_by_name("dataConfig"));
    assert!(!container.contains_by_name("pool"));
}

#[test]
fn test_source_with_missing_dependency_is_rolled_back() {
    struct Needy;
    struct Absent;

    impl Configuration for Needy {
        fn bean_methods(methods: &mut BeanMethods<Self>) {
            methods.bean("unused", |_: &Needy, _| Ok(1u8));
        }
    }

    let container = Container::new();
    let err = container
        .register_factory_source(BeanDefinition::new(|ctx| {
            ctx.get::<Absent>()?;
            Ok(Needy)
        }))
        .unwrap_err();

    match err {
        DiError::Registration { name, source, .. } => {
            assert_eq!(name, "needy");
            assert!(source.to_string().contains("Absent"));
        }
        other => panic!("expected Registration, got {:?}", other),
    }
    assert!(!container.contains_by_name("needy"));
    assert!(!container.contains_by_name("unused"));
}

#[test]
fn test_factory_names_do_not_replace_existing_beans() {
    let container = Container::new();
    container.register_type(BeanDefinition::new(|_| Ok(Pool { url: "direct".to_string() })).named("pool")).unwrap();
    container
        .register_factory_source(BeanDefinition::new(|_| Ok(DataConfig { url: "factory".to_string() })))
        .unwrap();

    assert_eq!(container.get_by_name_typed::<Pool>("pool").unwrap().url, "direct");
}

#[test]
fn test_type_registration_does_not_replace_factory_bean() {
    let container = Container::new();
    container
        .register_factory_source(BeanDefinition::new(|_| Ok(DataConfig { url: "factory".to_string() })))
        .unwrap();

    let inserted = container
        .register_type(BeanDefinition::new(|_| Ok(Pool { url: "direct".to_string() })).named("pool"))
        .unwrap();
    assert!(!inserted);

    let pool = container.descriptors().into_iter().find(|bean| bean.name == "pool").unwrap();
    assert_eq!(pool.owner(), Some("dataConfig"));
    assert_eq!(container.get_by_name_typed::<Pool>("pool").unwrap().url, "factory");
}

#[test]
fn test_optional_factory_producing_nothing_fails() {
    struct Maybe;

    impl Configuration for Maybe {
        fn bean_methods(methods: &mut BeanMethods<Self>) {
            methods.bean_opt("nothing", |_: &Maybe, _| Ok(None::<String>));
        }
    }

    let container = Container::new();
    container.register_factory_source(BeanDefinition::new(|_| Ok(Maybe))).unwrap();

    match container.get_by_name("nothing") {
        Err(DiError::Registration { name, source, .. }) => {
            assert_eq!(name, "nothing");
            assert_eq!(source.to_string(), "factory method produced no instance");
        }
        other => panic!("expected Registration, got {:?}", other),
    }
}

#[test]
fn test_factory_method_hooks_run() {
    struct Hooks;
    struct Conn {
        open: std::sync::atomic::AtomicBool,
    }

    impl Configuration for Hooks {
        fn bean_methods(methods: &mut BeanMethods<Self>) {
            methods.add(
                FactoryMethod::new("conn", |_: &Hooks, _| Ok(Conn { open: Default::default() })).post_construct(
                    |conn: &Conn| {
                        conn.open.store(true, Ordering::SeqCst);
                        Ok(())
                    },
                ),
            );
        }
    }

    let container = Container::new();
    container.register_factory_source(BeanDefinition::new(|_| Ok(Hooks))).unwrap();
    container.initialize().unwrap();

    assert!(container.get_by_name_typed::<Conn>("conn").unwrap().open.load(Ordering::SeqCst));
}
