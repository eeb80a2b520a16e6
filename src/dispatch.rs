//! In-process form of the dispatch-table calling convention.
//!
//! A [`DispatchTable`] maps literal function names to byte-level handlers and
//! is built once, before any call; lookups are O(1) and never depend on
//! registration order. Tables are published in a process-wide [`Registry`]
//! keyed by (file base name, exported service name).
//!
//! The registry follows an init-before-use discipline: services are added
//! while the process starts, then only looked up from request handling threads.
//!
//! This module is a standalone Rust host for the convention and is not used
//! by the generators. A table routes the same names as the `Do` switch
//! generated from [`dispatch_plan`](crate::generator::v2::dispatch_plan): one
//! entry per unary method, keyed by its literal schema name.

use crate::error::DispatchError;
use lazy_static::lazy_static;
use linked_hash_map::LinkedHashMap;
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

pub type Handler<S> = Box<dyn Fn(&[u8], &S) -> Result<Vec<u8>, DispatchError> + Send + Sync>;

/// Routing value identifying the caller of a dispatched function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Destination(pub String);

/// Literal function name => handler, immutable once built
pub struct DispatchTable<S> {
    handlers: LinkedHashMap<String, Handler<S>>,
}

impl<S> DispatchTable<S> {
    pub fn builder() -> DispatchTableBuilder<S> {
        DispatchTableBuilder {
            handlers: LinkedHashMap::new(),
        }
    }

    /// Call the handler registered under `function`.
    ///
    /// Unknown names fail with [`DispatchError::FunctionNotFound`] and no bytes.
    pub fn call(&self, function: &str, request: &[u8], sender: &S) -> Result<Vec<u8>, DispatchError> {
        match self.handlers.get(function) {
            Some(handler) => handler(request, sender),
            None => Err(DispatchError::FunctionNotFound),
        }
    }

    /// Registered function names, in registration order
    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

pub struct DispatchTableBuilder<S> {
    handlers: LinkedHashMap<String, Handler<S>>,
}

impl<S> DispatchTableBuilder<S> {
    /// Register `handler` under `function`; a later registration of the same name replaces it.
    pub fn route<F>(mut self, function: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[u8], &S) -> Result<Vec<u8>, DispatchError> + Send + Sync + 'static,
    {
        self.handlers.insert(function.into(), Box::new(handler));
        self
    }

    pub fn build(self) -> DispatchTable<S> {
        DispatchTable {
            handlers: self.handlers,
        }
    }
}

/// Build a byte-level handler from a typed one: decode the request, call,
/// and encode the response only when the call succeeded.
pub fn unary<S, Req, Res, D, F, E>(decode: D, call: F, encode: E) -> Handler<S>
where
    S: 'static,
    D: Fn(&[u8]) -> Result<Req, DispatchError> + Send + Sync + 'static,
    F: Fn(Req, &S) -> Result<Res, DispatchError> + Send + Sync + 'static,
    E: Fn(&Res) -> Result<Vec<u8>, DispatchError> + Send + Sync + 'static,
{
    Box::new(move |request: &[u8], sender: &S| {
        let request = decode(request)?;
        let response = call(request, sender)?;
        encode(&response)
    })
}

/// Services keyed by (file base name, exported service name)
pub struct Registry<T> {
    services: RwLock<HashMap<(String, String), Arc<T>>>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
        }
    }

    /// Register `service`, replacing any previous registration under the same key.
    pub fn add(&self, file: &str, service: &str, handler: T) {
        debug!(file, service, "registering service");
        self.services
            .write()
            .insert((file.to_string(), service.to_string()), Arc::new(handler));
    }

    pub fn get(&self, file: &str, service: &str) -> Option<Arc<T>> {
        self.services
            .read()
            .get(&(file.to_string(), service.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Registry<DispatchTable<S>> {
    /// Route a call to `function` of the service registered under (`file`, `service`).
    pub fn dispatch(
        &self,
        file: &str,
        service: &str,
        function: &str,
        request: &[u8],
        sender: &S,
    ) -> Result<Vec<u8>, DispatchError> {
        let table = self
            .get(file, service)
            .ok_or_else(|| DispatchError::ServiceNotFound {
                file: file.to_string(),
                service: service.to_string(),
            })?;
        table.call(function, request, sender)
    }
}

lazy_static! {
    static ref DISPATCH: Registry<DispatchTable<Destination>> = Registry::new();
}

/// The process-wide dispatch registry
pub fn dispatch_registry() -> &'static Registry<DispatchTable<Destination>> {
    &DISPATCH
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::thread;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct EchoRequest {
        text: String,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct EchoResponse {
        text: String,
        from: String,
    }

    fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, DispatchError> {
        serde_json::from_slice(bytes).map_err(|e| DispatchError::Handler(e.to_string()))
    }

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, DispatchError> {
        serde_json::to_vec(value).map_err(|e| DispatchError::Handler(e.to_string()))
    }

    fn echo_table() -> DispatchTable<Destination> {
        DispatchTable::builder()
            .route(
                "Say",
                unary(
                    decode::<EchoRequest>,
                    |req: EchoRequest, sender: &Destination| {
                        Ok(EchoResponse {
                            text: req.text,
                            from: sender.0.clone(),
                        })
                    },
                    encode::<EchoResponse>,
                ),
            )
            .route(
                "Fail",
                unary(
                    decode::<EchoRequest>,
                    |_req: EchoRequest, _sender: &Destination| -> Result<EchoResponse, DispatchError> {
                        Err(DispatchError::Handler("boom".into()))
                    },
                    encode::<EchoResponse>,
                ),
            )
            .build()
    }

    #[test]
    fn test_call() {
        let table = echo_table();
        let sender = Destination("node-1".into());
        let request = encode(&EchoRequest { text: "hi".into() }).unwrap();

        let response = table.call("Say", &request, &sender).unwrap();
        assert_eq!(
            decode::<EchoResponse>(&response).unwrap(),
            EchoResponse {
                text: "hi".into(),
                from: "node-1".into()
            }
        );
        assert_eq!(table.functions().collect::<Vec<_>>(), vec!["Say", "Fail"]);
    }

    #[test]
    fn test_unknown_function() {
        let table = echo_table();
        let result = table.call("Shout", b"{}", &Destination::default());

        assert_eq!(result, Err(DispatchError::FunctionNotFound));
        assert_eq!(DispatchError::FunctionNotFound.to_string(), "function not found");
    }

    #[test]
    fn test_errors_propagate_unchanged() {
        let table = echo_table();
        let sender = Destination::default();
        let request = encode(&EchoRequest { text: "hi".into() }).unwrap();

        assert_eq!(
            table.call("Fail", &request, &sender),
            Err(DispatchError::Handler("boom".into()))
        );
        assert!(matches!(
            table.call("Say", b"not json", &sender),
            Err(DispatchError::Handler(_))
        ));
    }

    #[test]
    fn test_table_from_dispatch_plan() {
        let service = crate::test_util::echo_watch_service();
        let plan = crate::generator::v2::dispatch_plan(&service).unwrap();

        let table = plan
            .keys()
            .fold(DispatchTable::builder(), |builder, function| {
                builder.route(*function, |request: &[u8], _sender: &Destination| {
                    Ok(request.to_vec())
                })
            })
            .build();

        assert_eq!(table.functions().collect::<Vec<_>>(), vec!["Get"]);
        assert_eq!(table.call("Get", b"ping", &Destination::default()), Ok(b"ping".to_vec()));
        assert_eq!(
            table.call("Watch", b"ping", &Destination::default()),
            Err(DispatchError::FunctionNotFound)
        );
    }

    #[test]
    fn test_registry() {
        let registry = Registry::new();
        registry.add("echo", "Echo", echo_table());
        let sender = Destination("node-2".into());
        let request = encode(&EchoRequest { text: "yo".into() }).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.dispatch("echo", "Echo", "Say", &request, &sender).is_ok());
        assert_eq!(
            registry.dispatch("echo", "Other", "Say", &request, &sender),
            Err(DispatchError::ServiceNotFound {
                file: "echo".into(),
                service: "Other".into()
            })
        );
        assert_eq!(
            registry.dispatch("echo", "Echo", "Missing", &request, &sender),
            Err(DispatchError::FunctionNotFound)
        );
    }

    #[test]
    fn test_global_registry_concurrent_lookups() {
        dispatch_registry().add("registry_test", "Echo", echo_table());
        let request = encode(&EchoRequest { text: "x".into() }).unwrap();

        let handles = (0..4)
            .map(|i| {
                let request = request.clone();
                thread::spawn(move || {
                    let sender = Destination(format!("worker-{}", i));
                    dispatch_registry().dispatch("registry_test", "Echo", "Say", &request, &sender)
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
    }
}
