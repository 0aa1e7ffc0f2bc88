use crate::{
    ComponentAdapter, ComponentKey, Container, ContainerBuilder, DynSvc,
    InjectError, InjectResult, PicoContainer, PicoVisitor, RequestInfo,
    Resolved, ServiceInfo, Svc,
};

/// A container holding string configuration parsed from command line
/// arguments.
///
/// Each argument is either `key=value`, or a bare `key` which is stored as
/// `"true"`. Values are registered under [`ComponentKey::Name`] keys.
///
/// ## Example
///
/// ```
/// use pico_container::{CommandLineContainer, ComponentKey, PicoContainerExt};
///
/// let container =
///     CommandLineContainer::new(["port=8080", "verbose"]).unwrap();
///
/// let port = container
///     .component_by_key::<String>(&ComponentKey::name("port"))
///     .unwrap()
///     .unwrap();
/// assert_eq!("8080", port.as_str());
///
/// let verbose = container
///     .component_by_key::<String>(&ComponentKey::name("verbose"))
///     .unwrap()
///     .unwrap();
/// assert_eq!("true", verbose.as_str());
/// ```
#[derive(Clone)]
pub struct CommandLineContainer {
    container: Container,
}

impl CommandLineContainer {
    /// The default separator between keys and values.
    pub const DEFAULT_SEPARATOR: char = '=';

    /// Parses `arguments` separated by `=`.
    pub fn new<I, S>(arguments: I) -> InjectResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CommandLineContainer::build(
            ContainerBuilder::new(),
            CommandLineContainer::DEFAULT_SEPARATOR,
            arguments,
        )
    }

    /// Parses `arguments` separated by `separator`.
    pub fn with_separator<I, S>(separator: char, arguments: I) -> InjectResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CommandLineContainer::build(ContainerBuilder::new(), separator, arguments)
    }

    /// Parses `arguments` separated by `=` into a child of `parent`.
    pub fn with_parent<I, S>(parent: &Container, arguments: I) -> InjectResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CommandLineContainer::build(
            ContainerBuilder::new().with_parent(parent),
            CommandLineContainer::DEFAULT_SEPARATOR,
            arguments,
        )
    }

    fn build<I, S>(
        builder: ContainerBuilder,
        separator: char,
        arguments: I,
    ) -> InjectResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let container = builder.with_name("command-line").build();
        for argument in arguments {
            let argument = argument.as_ref();
            let (key, value) = parse_argument(separator, argument)?;
            container.add_config(key, value)?;
        }

        Ok(CommandLineContainer { container })
    }

    /// The container holding the parsed arguments.
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }
}

fn parse_argument(separator: char, argument: &str) -> InjectResult<(String, String)> {
    let mut parts: Vec<&str> = argument.split(separator).collect();
    while parts.len() > 1 && parts.last() == Some(&"") {
        parts.pop();
    }

    let (key, value) = match parts.as_slice() {
        [key] => (*key, "true"),
        [key, value] => (*key, *value),
        _ => {
            return Err(InjectError::Composition(format!(
                "argument '{}' has more than one '{}'",
                argument, separator
            )));
        }
    };
    if key.is_empty() {
        return Err(InjectError::Composition(format!(
            "argument '{}' has no name",
            argument
        )));
    }

    Ok((key.to_string(), value.to_string()))
}

impl PicoContainer for CommandLineContainer {
    fn as_dyn(&self) -> &dyn PicoContainer {
        self
    }

    fn handle(&self) -> Svc<dyn PicoContainer> {
        self.container.handle()
    }

    fn find_by_key(&self, key: &ComponentKey) -> Option<Resolved> {
        self.container.find_by_key(key)
    }

    fn find_by_type(
        &self,
        service_info: ServiceInfo,
    ) -> InjectResult<Option<Resolved>> {
        self.container.find_by_type(service_info)
    }

    fn find_all(&self, service_info: ServiceInfo) -> Vec<Resolved> {
        self.container.find_all(service_info)
    }

    fn component_adapters(&self) -> Vec<Svc<dyn ComponentAdapter>> {
        self.container.component_adapters()
    }

    fn parent(&self) -> Option<Svc<dyn PicoContainer>> {
        self.container.parent()
    }

    fn instantiate(
        &self,
        adapter: &Svc<dyn ComponentAdapter>,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        self.container.instantiate(adapter, request_info)
    }

    fn accept(&self, visitor: &mut dyn PicoVisitor) {
        self.container.accept(visitor);
    }

    fn no_component_found(&self, key: &ComponentKey) {
        self.container.no_component_found(key);
    }

    fn name(&self) -> String {
        self.container.name()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        CommandLineContainer, ComponentKey, Container, InjectError,
        PicoContainerExt,
    };

    fn value(container: &CommandLineContainer, key: &str) -> Option<String> {
        container
            .component_by_key::<String>(&ComponentKey::name(key))
            .unwrap()
            .map(|value| value.to_string())
    }

    #[test]
    fn custom_separators_are_supported() {
        let container =
            CommandLineContainer::with_separator(':', ["mode:fast"]).unwrap();
        assert_eq!(Some("fast".to_string()), value(&container, "mode"));
    }

    #[test]
    fn extra_separators_are_rejected() {
        match CommandLineContainer::new(["a=b=c"]) {
            Err(InjectError::Composition(_)) => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("argument should be rejected"),
        }
    }

    #[test]
    fn bare_flags_are_true() {
        let container = CommandLineContainer::new(["debug", "verbose="]).unwrap();
        assert_eq!(Some("true".to_string()), value(&container, "debug"));
        assert_eq!(Some("true".to_string()), value(&container, "verbose"));
    }

    #[test]
    fn unnamed_arguments_are_rejected() {
        for argument in ["", "=", "=value"] {
            match CommandLineContainer::new([argument]) {
                Err(InjectError::Composition(_)) => {}
                Err(error) => Err(error).unwrap(),
                Ok(_) => unreachable!("argument '{}' should be rejected", argument),
            }
        }
    }

    #[test]
    fn parent_configuration_is_visible() {
        let parent = Container::new();
        parent.add_config("user", "admin".to_string()).unwrap();
        let container =
            CommandLineContainer::with_parent(&parent, ["level=3"]).unwrap();

        assert_eq!(Some("admin".to_string()), value(&container, "user"));
        assert_eq!(Some("3".to_string()), value(&container, "level"));
        assert_eq!(None, value(&container, "missing"));
    }
}
