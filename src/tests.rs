use crate::{
    characteristics::{CACHE, HIDE_IMPL, HOT_SWAP},
    interface, BoxError, ComponentKey, ComponentMonitor, Container,
    Disposable, HotSwappable, InjectError, InjectResult,
    LifecycleComponentMonitor, LifecyclePhase, PicoContainer,
    PicoContainerExt, Service, ServiceInfo, Services, Startable, Svc,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

#[derive(Default)]
struct Svc1(pub i32);

struct Svc2 {
    pub dep1: Svc<Svc1>,
}

impl Svc2 {
    pub fn new(dep1: Svc<Svc1>) -> Self {
        Svc2 { dep1 }
    }
}

struct Svc3 {
    pub dep1: Svc<Svc1>,
    pub dep2: Svc<Svc2>,
}

impl Svc3 {
    pub fn new(dep1: Svc<Svc1>, dep2: Svc<Svc2>) -> Self {
        Svc3 { dep1, dep2 }
    }
}

#[test]
fn can_make_svc1() {
    let container = Container::new();
    container.add_component(Svc1::default).unwrap();

    let _service: Svc<Svc1> = container.get().unwrap();
}

#[test]
fn cant_make_svc1_when_not_registered() {
    let container = Container::new();
    let svc: InjectResult<Svc<Svc1>> = container.get();
    match svc {
        Err(InjectError::MissingComponent { key })
            if key == ComponentKey::of::<Svc1>() => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!(),
    }

    let svc: Option<Svc<Svc1>> = container.get().unwrap();
    match svc {
        None => {}
        Some(_) => panic!("component should not have been created"),
    }
}

#[test]
fn cached_dependencies_are_shared() {
    let container = Container::new();
    container.as_(CACHE).add_component(Svc1::default).unwrap();
    container.add_component(Svc2::new).unwrap();
    container.add_component(Svc3::new).unwrap();

    let svc3: Svc<Svc3> = container.get().unwrap();
    assert!(Svc::ptr_eq(&svc3.dep1, &svc3.dep2.dep1));
}

#[test]
fn per_request_dependencies_are_not_shared() {
    let container = Container::new();
    container.add_component(Svc1::default).unwrap();
    container.add_component(Svc2::new).unwrap();
    container.add_component(Svc3::new).unwrap();

    let svc3: Svc<Svc3> = container.get().unwrap();
    assert!(!Svc::ptr_eq(&svc3.dep1, &svc3.dep2.dep1));
}

#[test]
fn missing_dependencies_are_reported() {
    let container = Container::new();
    container.add_component(Svc2::new).unwrap();

    match container.get::<Svc<Svc2>>() {
        Err(InjectError::MissingComponent { key })
            if key == ComponentKey::of::<Svc1>() => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("dependency should be missing"),
    }

    match container.verify() {
        Err(InjectError::MissingDependency {
            service_info,
            dependency,
        }) => {
            assert_eq!(ServiceInfo::of::<Svc2>(), service_info);
            assert_eq!(ComponentKey::of::<Svc1>(), dependency);
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("verification should fail"),
    }
}

trait Speaker: Service {
    fn speak(&self) -> &'static str;
}

#[derive(Default)]
struct Dog;
impl Speaker for Dog {
    fn speak(&self) -> &'static str {
        "woof"
    }
}

#[derive(Default)]
struct Cat;
impl Speaker for Cat {
    fn speak(&self) -> &'static str {
        "meow"
    }
}

interface!(Speaker = [Dog, Cat]);

#[test]
fn several_implementations_are_ambiguous() {
    let container = Container::new();
    container
        .register(Dog::default)
        .with_interface::<dyn Speaker>()
        .add()
        .unwrap();
    container
        .register(Cat::default)
        .with_interface::<dyn Speaker>()
        .add()
        .unwrap();

    match container.get::<Svc<dyn Speaker>>() {
        Err(InjectError::AmbiguousResolution { candidates, .. }) => {
            assert_eq!(
                vec![ComponentKey::of::<Dog>(), ComponentKey::of::<Cat>()],
                candidates
            );
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("request should be ambiguous"),
    }

    let speakers: Services<dyn Speaker> = container.get().unwrap();
    let sounds: Vec<_> = speakers
        .get_all()
        .map(|speaker| speaker.unwrap().speak())
        .collect();
    assert_eq!(vec!["woof", "meow"], sounds);
}

#[test]
fn interface_keys_win_over_other_implementations() {
    let container = Container::new();
    container
        .register(Dog::default)
        .with_interface::<dyn Speaker>()
        .add()
        .unwrap();
    container
        .register(Cat::default)
        .implementing::<dyn Speaker>()
        .add()
        .unwrap();

    let speaker: Svc<dyn Speaker> = container.get().unwrap();
    assert_eq!("meow", speaker.speak());
}

#[test]
fn hidden_implementations_cannot_be_requested_directly() {
    let container = Container::new();
    container
        .register(Dog::default)
        .implementing::<dyn Speaker>()
        .characteristics(HIDE_IMPL)
        .add()
        .unwrap();

    assert!(container.component::<dyn Speaker>().unwrap().is_some());
    assert!(container.component::<Dog>().unwrap().is_none());
}

#[test]
fn hot_swapped_instances_reach_new_requests() {
    let container = Container::new();
    let adapter = container
        .register(|| Svc1(1))
        .characteristics(HOT_SWAP)
        .add()
        .unwrap();

    assert_eq!(1, container.get::<Svc<Svc1>>().unwrap().0);
    let swappable = adapter.find_adapter_of_type::<HotSwappable>().unwrap();
    let previous = swappable.swap(Svc::new(Svc1(2))).unwrap();
    assert!(previous.is_some());
    assert_eq!(2, container.get::<Svc<Svc1>>().unwrap().0);
}

struct Flaky;

impl Startable for Flaky {
    fn start(&self) -> Result<(), BoxError> {
        Err("refused to start".into())
    }

    fn stop(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[derive(Default)]
struct Steady {
    starts: AtomicUsize,
}

impl Startable for Steady {
    fn start(&self) -> Result<(), BoxError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[test]
fn lifecycle_failures_abort_by_default() {
    let container = Container::new();
    container
        .register(|| Flaky)
        .characteristics(CACHE)
        .startable()
        .add()
        .unwrap();

    match container.start() {
        Err(InjectError::LifecycleFailed { key, phase, .. }) => {
            assert_eq!(ComponentKey::of::<Flaky>(), key);
            assert_eq!(LifecyclePhase::Start, phase);
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("start should fail"),
    }
}

#[test]
fn lifecycle_monitor_collects_failures() {
    let monitor = Svc::new(LifecycleComponentMonitor::new());
    let container = Container::builder()
        .with_lifecycle()
        .with_monitor(monitor.clone())
        .build();
    container
        .register(|| Flaky)
        .characteristics(CACHE)
        .startable()
        .add()
        .unwrap();
    container
        .register(Steady::default)
        .characteristics(CACHE)
        .startable()
        .add()
        .unwrap();

    container.start().unwrap();
    let steady: Svc<Steady> = container.get().unwrap();
    assert_eq!(1, steady.starts.load(Ordering::SeqCst));

    match monitor.rethrow_failures() {
        Err(InjectError::LifecycleFailures { failures }) => {
            assert_eq!(1, failures.len());
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("failure should be collected"),
    }
}

#[test]
fn lazy_lifecycle_starts_on_first_use() {
    let container = Container::builder().with_lazy_lifecycle().build();
    container
        .register(Steady::default)
        .characteristics(CACHE)
        .startable()
        .add()
        .unwrap();

    container.start().unwrap();
    let steady: Svc<Steady> = container.get().unwrap();
    assert_eq!(1, steady.starts.load(Ordering::SeqCst));

    let _again: Svc<Steady> = container.get().unwrap();
    assert_eq!(1, steady.starts.load(Ordering::SeqCst));
}

#[derive(Default)]
struct SlowStart {
    starts: AtomicUsize,
}

impl Startable for SlowStart {
    fn start(&self) -> Result<(), BoxError> {
        thread::sleep(Duration::from_millis(50));
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[test]
fn concurrent_first_uses_start_once() {
    let container = Container::builder().with_lazy_lifecycle().build();
    container
        .register(SlowStart::default)
        .characteristics(CACHE)
        .startable()
        .add()
        .unwrap();
    container.start().unwrap();

    let results: Vec<InjectResult<Svc<SlowStart>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| container.get::<Svc<SlowStart>>()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for result in results {
        let component = result.unwrap();
        assert_eq!(1, component.starts.load(Ordering::SeqCst));
    }
}

#[test]
fn components_added_after_start_are_started() {
    let container = Container::new();
    container.start().unwrap();
    container
        .register(Steady::default)
        .characteristics(CACHE)
        .startable()
        .add()
        .unwrap();

    let steady: Svc<Steady> = container.get().unwrap();
    assert_eq!(1, steady.starts.load(Ordering::SeqCst));
}

#[derive(Default)]
struct Resource {
    disposed: AtomicUsize,
}

impl Disposable for Resource {
    fn dispose(&self) -> Result<(), BoxError> {
        self.disposed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn disposable_instances_are_disposed_once() {
    let resource = Svc::new(Resource::default());
    let container = Container::new();
    container
        .register_shared(resource.clone())
        .disposable()
        .add()
        .unwrap();

    container.start().unwrap();
    container.dispose().unwrap();
    assert_eq!(1, resource.disposed.load(Ordering::SeqCst));
    assert!(container.dispose().is_err());
}

#[test]
fn grandchildren_see_every_ancestor() {
    let root = Container::new();
    root.add_component(Svc1::default).unwrap();
    let middle = root.make_child();
    middle.add_component(Svc2::new).unwrap();
    let leaf = middle.make_child();
    leaf.add_component(Svc3::new).unwrap();

    let _svc3: Svc<Svc3> = leaf.get().unwrap();
    assert!(root.component::<Svc3>().unwrap().is_none());
    assert!(middle.component::<Svc3>().unwrap().is_none());
}

#[derive(Default)]
struct RecordingMonitor {
    events: Mutex<Vec<String>>,
}

impl ComponentMonitor for RecordingMonitor {
    fn instantiated(
        &self,
        key: &ComponentKey,
        _implementation: ServiceInfo,
        injected: &[ServiceInfo],
        _duration: Duration,
    ) {
        self.events
            .lock()
            .push(format!("instantiated {} with {}", key, injected.len()));
    }

    fn no_component_found(&self, key: &ComponentKey) {
        self.events.lock().push(format!("missing {}", key));
    }
}

#[test]
fn monitors_can_be_changed() {
    let first = Svc::new(RecordingMonitor::default());
    let second = Svc::new(RecordingMonitor::default());
    let container = Container::builder().with_monitor(first.clone()).build();
    let child = container.make_child();
    container.add_component(Svc1::default).unwrap();
    container.add_component(Svc2::new).unwrap();

    let _svc2: Svc<Svc2> = container.get().unwrap();
    assert_eq!(2, first.events.lock().len());

    container.change_monitor(second.clone());
    let _missing = child
        .component_by_key::<Svc1>(&ComponentKey::name("nothing"))
        .unwrap();
    assert_eq!(2, first.events.lock().len());
    assert_eq!(vec!["missing nothing".to_string()], *second.events.lock());
}

#[test]
fn tracing_monitor_logs_resolutions() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();

    let container = Container::builder()
        .with_name("traced")
        .with_tracing_monitor()
        .with_lifecycle()
        .build();
    container
        .register(Steady::default)
        .characteristics(CACHE)
        .startable()
        .add()
        .unwrap();

    container.start().unwrap();
    let _missing: Option<Svc<Svc1>> = container.get().unwrap();
    container.dispose().unwrap();
}

#[test]
fn verify_walks_child_containers() {
    let parent = Container::new();
    let child = parent.make_child();
    child.add_component(Svc2::new).unwrap();

    assert!(parent.verify().is_err());
    parent.add_component(Svc1::default).unwrap();
    parent.verify().unwrap();
    assert_eq!(1, child.component_adapters().len());
}
