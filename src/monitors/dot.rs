use crate::{
    ComponentKey, ComponentMonitor, InjectError, InjectResult, LifecyclePhase,
    NullComponentMonitor, ServiceInfo, Svc,
};
use parking_lot::Mutex;
use std::{collections::BTreeSet, time::Duration};

/// Records every instantiation and renders the dependencies between the
/// instantiated types as the body of a DOT graph.
///
/// ## Example
///
/// ```
/// use pico_container::{
///     Container, DotDependencyGraphMonitor, PicoContainerExt, Svc,
/// };
///
/// #[derive(Default)]
/// struct Engine;
/// struct Car(Svc<Engine>);
///
/// let monitor = Svc::new(DotDependencyGraphMonitor::new());
/// let container = Container::builder().with_monitor(monitor.clone()).build();
/// container.add_component(Engine::default).unwrap();
/// container.add_component(Car).unwrap();
///
/// let _car: Svc<Car> = container.get().unwrap();
/// let graph = monitor.dependency_graph();
/// assert!(graph.contains("Car\" -> \""));
/// ```
pub struct DotDependencyGraphMonitor {
    delegate: Svc<dyn ComponentMonitor>,
    instantiations: Mutex<Vec<(ServiceInfo, Vec<ServiceInfo>)>>,
}

impl DotDependencyGraphMonitor {
    /// Creates a monitor which forwards other events nowhere.
    #[must_use]
    pub fn new() -> Self {
        DotDependencyGraphMonitor::wrapping(Svc::new(NullComponentMonitor))
    }

    /// Creates a monitor which forwards events to `delegate`.
    #[must_use]
    pub fn wrapping(delegate: Svc<dyn ComponentMonitor>) -> Self {
        DotDependencyGraphMonitor {
            delegate,
            instantiations: Mutex::new(Vec::new()),
        }
    }

    /// Renders one sorted `"A" -> "B";` line for each distinct dependency
    /// that was injected so far.
    #[must_use]
    pub fn dependency_graph(&self) -> String {
        let instantiations = self.instantiations.lock();
        let lines: BTreeSet<String> = instantiations
            .iter()
            .flat_map(|(implementation, injected)| {
                injected.iter().map(move |dependency| {
                    format!(
                        "  \"{}\" -> \"{}\";\n",
                        implementation.name(),
                        dependency.name()
                    )
                })
            })
            .collect();
        lines.into_iter().collect()
    }
}

impl Default for DotDependencyGraphMonitor {
    fn default() -> Self {
        DotDependencyGraphMonitor::new()
    }
}

impl ComponentMonitor for DotDependencyGraphMonitor {
    fn instantiating(&self, key: &ComponentKey, implementation: ServiceInfo) {
        self.delegate.instantiating(key, implementation);
    }

    fn instantiated(
        &self,
        key: &ComponentKey,
        implementation: ServiceInfo,
        injected: &[ServiceInfo],
        duration: Duration,
    ) {
        self.instantiations
            .lock()
            .push((implementation, injected.to_vec()));
        self.delegate
            .instantiated(key, implementation, injected, duration);
    }

    fn instantiation_failed(
        &self,
        key: &ComponentKey,
        implementation: ServiceInfo,
        error: &InjectError,
    ) {
        self.delegate.instantiation_failed(key, implementation, error);
    }

    fn invoking(&self, key: &ComponentKey, phase: LifecyclePhase) {
        self.delegate.invoking(key, phase);
    }

    fn invoked(
        &self,
        key: &ComponentKey,
        phase: LifecyclePhase,
        duration: Duration,
    ) {
        self.delegate.invoked(key, phase, duration);
    }

    fn lifecycle_invocation_failed(
        &self,
        key: &ComponentKey,
        phase: LifecyclePhase,
        error: InjectError,
    ) -> InjectResult<()> {
        self.delegate.lifecycle_invocation_failed(key, phase, error)
    }

    fn no_component_found(&self, key: &ComponentKey) {
        self.delegate.no_component_found(key);
    }

    fn new_injector(&self, descriptor: &str) {
        self.delegate.new_injector(descriptor);
    }

    fn new_behavior(&self, descriptor: &str) {
        self.delegate.new_behavior(descriptor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interface, Container, PicoContainerExt, Service};
    use pretty_assertions::assert_eq;

    struct A;
    struct B;

    trait Engine: Service {}
    struct V8;
    impl Engine for V8 {}
    interface!(Engine = [V8]);

    struct Car(Svc<dyn Engine>);
    struct Radio;
    struct Dashboard(Option<Svc<Radio>>);

    #[test]
    fn graph_lines_are_sorted_and_unique() {
        let monitor = DotDependencyGraphMonitor::new();
        let key = ComponentKey::of::<A>();
        let injected = [ServiceInfo::of::<B>(), ServiceInfo::of::<A>()];
        monitor.instantiated(
            &key,
            ServiceInfo::of::<A>(),
            &injected,
            Duration::ZERO,
        );
        monitor.instantiated(
            &key,
            ServiceInfo::of::<A>(),
            &injected,
            Duration::ZERO,
        );

        let a = ServiceInfo::of::<A>().name();
        let b = ServiceInfo::of::<B>().name();
        let expected = format!(
            "  \"{a}\" -> \"{a}\";\n  \"{a}\" -> \"{b}\";\n",
            a = a,
            b = b
        );
        assert_eq!(expected, monitor.dependency_graph());
    }

    #[test]
    fn graph_shows_injected_implementations() {
        let monitor = Svc::new(DotDependencyGraphMonitor::new());
        let container = Container::builder().with_monitor(monitor.clone()).build();
        container
            .register(|| V8)
            .with_interface::<dyn Engine>()
            .add()
            .unwrap();
        container.add_component(Car).unwrap();
        container.add_component(Dashboard).unwrap();

        let _car: Svc<Car> = container.get().unwrap();
        let dashboard: Svc<Dashboard> = container.get().unwrap();
        assert!(dashboard.0.is_none());

        let expected = format!(
            "  \"{}\" -> \"{}\";\n",
            ServiceInfo::of::<Car>().name(),
            ServiceInfo::of::<V8>().name()
        );
        assert_eq!(expected, monitor.dependency_graph());
    }
}
