use crate::{
    comment::Comment,
    go_type::GoIdent,
    ident::Ident,
    shape::{classify, CallShape},
};
use serde::Deserialize;
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodSchema {
    pub name: Ident,

    /// Request message type
    pub input: GoIdent,

    /// Response message type
    pub output: GoIdent,

    #[serde(default)]
    pub client_streaming: bool,

    #[serde(default)]
    pub server_streaming: bool,

    #[serde(default)]
    pub deprecated: bool,

    /// leading comment extracted from the source proto file
    #[serde(default)]
    pub comments: Option<Comment>,
}

impl MethodSchema {
    pub fn new(name: Ident, input: GoIdent, output: GoIdent) -> Self {
        Self {
            name,
            input,
            output,
            client_streaming: false,
            server_streaming: false,
            deprecated: false,
            comments: None,
        }
    }

    pub fn shape(&self) -> CallShape {
        classify(self)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceSchema {
    pub name: Ident,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub comments: Option<Comment>,

    pub methods: Vec<MethodSchema>,
}

impl ServiceSchema {
    pub fn new(name: Ident) -> ServiceSchema {
        Self {
            name,
            deprecated: false,
            comments: None,
            methods: Vec::new(),
        }
    }

    pub fn add_method(&mut self, method: MethodSchema) {
        self.methods.push(method);
    }

    /// Methods in schema order, each paired with this service.
    pub fn methods(&self) -> impl Iterator<Item = MethodRef<'_>> {
        self.methods
            .iter()
            .map(move |method| MethodRef { service: self, method })
    }

    /// Methods in schema order restricted to one shape family.
    pub fn unary_methods(&self) -> impl Iterator<Item = MethodRef<'_>> {
        self.methods().filter(|m| m.shape().is_unary())
    }

    pub fn streaming_methods(&self) -> impl Iterator<Item = MethodRef<'_>> {
        self.methods().filter(|m| m.shape().is_streaming())
    }
}

/// A method borrowed together with the service that owns it.
#[derive(Debug, Clone, Copy)]
pub struct MethodRef<'a> {
    pub service: &'a ServiceSchema,
    pub method: &'a MethodSchema,
}

impl<'a> Deref for MethodRef<'a> {
    type Target = MethodSchema;

    fn deref(&self) -> &MethodSchema {
        self.method
    }
}
