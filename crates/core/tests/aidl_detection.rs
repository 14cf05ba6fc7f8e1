use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dexlens_core::aidl::{
    detect_aidl_interface, find_first, resolve_batch, resolve_implementation, AidlInterface,
    ClassSearch, ImplementationResolver, ListClassSearch, ResolutionCache,
};
use dexlens_core::model::{ClassSymbol, MethodSymbol};
use dexlens_core::CoreError;

fn aidl_interface(name: &str) -> ClassSymbol {
    ClassSymbol::new(name)
        .with_method(MethodSymbol::new("getValue", &["java.lang.String", "int"], "long"))
        .with_method(MethodSymbol::new("reset", &[], "void"))
        .with_inner(ClassSymbol::new(format!("{name}.Default")))
        .with_inner(
            ClassSymbol::new(format!("{name}.Stub"))
                .with_superclass("android.os.Binder")
                .with_inner(ClassSymbol::new(format!("{name}.Stub.Proxy"))),
        )
}

fn implementation(name: &str, interface: &str) -> ClassSymbol {
    ClassSymbol::new(name).with_superclass(format!("{interface}$Stub"))
}

fn locate<'a>(classes: &[&'a ClassSymbol], name: &str) -> Option<&'a ClassSymbol> {
    classes.iter().copied().find(|c| c.full_name == name)
}

/// Counts how many scans the resolver performs.
struct CountingSearch<'a> {
    inner: ListClassSearch<'a>,
    scans: &'a AtomicUsize,
}

impl ClassSearch for CountingSearch<'_> {
    fn find_class(&self, predicate: &dyn Fn(&ClassSymbol) -> bool) -> Option<&ClassSymbol> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.find_class(predicate)
    }
}

#[test]
fn detects_generated_interface_shape() {
    let iface = aidl_interface("com.example.IFoo");
    let detected = detect_aidl_interface(&iface).expect("should detect");
    assert_eq!(detected.interface_name(), "com.example.IFoo");
    assert_eq!(
        detected.methods(),
        &[
            "com.example.IFoo.getValue(java.lang.String, int):long".to_string(),
            "com.example.IFoo.reset():void".to_string(),
        ]
    );
    assert_eq!(detected.implementation(), None);
    assert_eq!(detected.stub_class_name(), "com.example.IFoo$Stub");
}

#[test]
fn missing_any_nested_class_fails_detection() {
    let no_default = ClassSymbol::new("a.IFoo").with_inner(
        ClassSymbol::new("a.IFoo.Stub").with_inner(ClassSymbol::new("a.IFoo.Stub.Proxy")),
    );
    assert!(detect_aidl_interface(&no_default).is_none());

    let no_stub = ClassSymbol::new("a.IFoo").with_inner(ClassSymbol::new("a.IFoo.Default"));
    assert!(detect_aidl_interface(&no_stub).is_none());

    let no_proxy = ClassSymbol::new("a.IFoo")
        .with_inner(ClassSymbol::new("a.IFoo.Default"))
        .with_inner(ClassSymbol::new("a.IFoo.Stub"));
    assert!(detect_aidl_interface(&no_proxy).is_none());

    // Proxy directly under the interface does not count.
    let misplaced_proxy = ClassSymbol::new("a.IFoo")
        .with_inner(ClassSymbol::new("a.IFoo.Default"))
        .with_inner(ClassSymbol::new("a.IFoo.Stub"))
        .with_inner(ClassSymbol::new("a.IFoo.Proxy"));
    assert!(detect_aidl_interface(&misplaced_proxy).is_none());

    assert!(detect_aidl_interface(&ClassSymbol::new("a.Plain")).is_none());
}

#[test]
fn find_first_returns_earliest_match() {
    let a = ClassSymbol::new("a.A").with_superclass("x.Base");
    let b = ClassSymbol::new("a.B").with_superclass("x.Base");
    let c = ClassSymbol::new("a.C");
    let classes = vec![&c, &a, &b];

    let hit = find_first(&classes, |class| class.superclass.as_deref() == Some("x.Base"));
    assert_eq!(hit.map(|c| c.full_name.as_str()), Some("a.A"));
    assert!(find_first(&classes, |class| class.full_name == "a.Z").is_none());

    let search = ListClassSearch::new(&classes);
    let hit = search.find_class(&|class: &ClassSymbol| class.full_name == "a.C");
    assert_eq!(hit.map(|c| c.name.as_str()), Some("C"));
}

#[test]
fn resolves_single_extender() {
    let iface = aidl_interface("com.example.IFoo");
    let service = implementation("com.example.FooService", "com.example.IFoo");
    let unrelated = ClassSymbol::new("com.example.Other").with_superclass("android.app.Service");
    let classes = vec![&iface, &unrelated, &service];

    let detected = detect_aidl_interface(&iface).unwrap();
    let found = resolve_implementation(&detected, &ListClassSearch::new(&classes));
    assert_eq!(found.as_deref(), Some("com.example.FooService"));
}

#[test]
fn resolves_none_without_extender() {
    let iface = aidl_interface("com.example.IFoo");
    // The stub itself extends Binder, not IFoo$Stub.
    let classes = vec![&iface];
    let detected = detect_aidl_interface(&iface).unwrap();
    assert_eq!(resolve_implementation(&detected, &ListClassSearch::new(&classes)), None);
}

#[test]
fn first_extender_in_search_order_wins() {
    let iface = aidl_interface("com.example.IFoo");
    let first = implementation("com.example.FirstService", "com.example.IFoo");
    let second = implementation("com.example.SecondService", "com.example.IFoo");
    let detected = detect_aidl_interface(&iface).unwrap();

    let classes = vec![&iface, &first, &second];
    assert_eq!(
        resolve_implementation(&detected, &ListClassSearch::new(&classes)).as_deref(),
        Some("com.example.FirstService")
    );

    let reversed = vec![&second, &first, &iface];
    assert_eq!(
        resolve_implementation(&detected, &ListClassSearch::new(&reversed)).as_deref(),
        Some("com.example.SecondService")
    );
}

#[test]
fn cached_lookup_does_not_rescan() {
    let iface = aidl_interface("com.example.IFoo");
    let service = implementation("com.example.FooService", "com.example.IFoo");
    let classes = vec![&iface, &service];

    let scans = AtomicUsize::new(0);
    let cache = ResolutionCache::new();
    let resolver = ImplementationResolver::new(
        &cache,
        CountingSearch { inner: ListClassSearch::new(&classes), scans: &scans },
    );

    let first = resolver.lookup("com.example.IFoo", false, |n| locate(&classes, n)).unwrap();
    assert_eq!(first.implementation(), Some("com.example.FooService"));
    assert_eq!(scans.load(Ordering::SeqCst), 1);

    for _ in 0..3 {
        let again = resolver.lookup("com.example.IFoo", false, |n| locate(&classes, n)).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
    assert_eq!(scans.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn forced_lookup_rescans_and_overwrites() {
    let iface = aidl_interface("com.example.IFoo");
    let service = implementation("com.example.FooService", "com.example.IFoo");
    let classes = vec![&iface, &service];

    let scans = AtomicUsize::new(0);
    let cache = ResolutionCache::new();
    let resolver = ImplementationResolver::new(
        &cache,
        CountingSearch { inner: ListClassSearch::new(&classes), scans: &scans },
    );

    let first = resolver.lookup("com.example.IFoo", false, |n| locate(&classes, n)).unwrap();
    let forced = resolver.lookup("com.example.IFoo", true, |n| locate(&classes, n)).unwrap();
    assert_eq!(scans.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&first, &forced));
    assert_eq!(*first, *forced);

    let cached = cache.get("com.example.IFoo").unwrap();
    assert!(Arc::ptr_eq(&cached, &forced));
}

#[test]
fn cache_hit_skips_locating_the_class() {
    let iface = aidl_interface("com.example.IFoo");
    let classes = vec![&iface];
    let cache = ResolutionCache::new();
    let resolver = ImplementationResolver::new(&cache, ListClassSearch::new(&classes));

    resolver.lookup("com.example.IFoo", false, |n| locate(&classes, n)).unwrap();
    let hit = resolver
        .lookup("com.example.IFoo", false, |_| panic!("locate must not run on a cache hit"))
        .unwrap();
    assert_eq!(hit.interface_name(), "com.example.IFoo");
}

#[test]
fn lookup_of_missing_or_plain_class_is_not_found() {
    let plain = ClassSymbol::new("com.example.Plain");
    let classes = vec![&plain];
    let cache = ResolutionCache::new();
    let resolver = ImplementationResolver::new(&cache, ListClassSearch::new(&classes));

    let err = resolver.lookup("com.example.Missing", false, |n| locate(&classes, n)).unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    let err = resolver.lookup("com.example.Plain", false, |n| locate(&classes, n)).unwrap_err();
    assert!(err.is_not_found());
    assert!(cache.is_empty());
}

#[test]
fn batch_resolution_matches_per_interface_resolution() {
    let foo = aidl_interface("com.example.IFoo");
    let bar = aidl_interface("com.example.IBar");
    let foo_a = implementation("com.example.FooA", "com.example.IFoo");
    let foo_b = implementation("com.example.FooB", "com.example.IFoo");
    let classes = vec![&foo, &bar, &foo_a, &foo_b];

    let detected = vec![detect_aidl_interface(&foo).unwrap(), detect_aidl_interface(&bar).unwrap()];
    let batch = resolve_batch(&detected, &classes);

    let search = ListClassSearch::new(&classes);
    for (single, batched) in detected.iter().zip(&batch) {
        assert_eq!(resolve_implementation(single, &search).as_deref(), batched.implementation());
    }
    assert_eq!(batch[0].implementation(), Some("com.example.FooA"));
    assert_eq!(batch[1].implementation(), None);
}

#[test]
fn cache_reports_sorted_names_and_clears() {
    let foo = aidl_interface("com.example.IFoo");
    let bar = aidl_interface("com.example.IBar");
    let cache = ResolutionCache::new();
    cache.insert(detect_aidl_interface(&foo).unwrap());
    cache.insert(detect_aidl_interface(&bar).unwrap());

    assert_eq!(cache.names(), vec!["com.example.IBar", "com.example.IFoo"]);
    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.get("com.example.IFoo").is_none());
}

#[test]
fn concurrent_lookups_share_one_cache_entry() {
    let iface = aidl_interface("com.example.IFoo");
    let service = implementation("com.example.FooService", "com.example.IFoo");
    let classes = vec![&iface, &service];
    let cache = ResolutionCache::new();
    let resolver = ImplementationResolver::new(&cache, ListClassSearch::new(&classes));

    let results: Vec<Arc<AidlInterface>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let resolver = &resolver;
                let classes = &classes;
                scope.spawn(move || {
                    let force = i % 2 == 0;
                    resolver
                        .lookup("com.example.IFoo", force, |n| locate(classes, n))
                        .expect("lookup succeeds under contention")
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("lookup thread panicked")).collect()
    });

    assert_eq!(results.len(), 8);
    assert_eq!(cache.len(), 1);

    let detected = detect_aidl_interface(&iface).unwrap();
    let fresh = detected.resolved(resolve_implementation(&detected, &ListClassSearch::new(&classes)));
    let stored = cache.get("com.example.IFoo").unwrap();
    assert_eq!(*stored, fresh);
    for result in &results {
        assert_eq!(**result, fresh);
    }
}
