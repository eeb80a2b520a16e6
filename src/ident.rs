//! Identifier derivation.
//!
//! Every name printed into generated code is derived here from a schema name,
//! either by changing the case of its first character or by concatenating it
//! with one of the fixed tokens below. Composite names stay collision-free as
//! long as (service, method) pairs are unique and each token keeps a single
//! purpose.

use crate::error::{GenerateError, Result};
use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;
use serde::Deserialize;
use std::{convert::TryFrom, fmt, ops::Deref};

/// Go keywords, which an unexported derived name must never collide with.
static GO_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface",
    "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
};

lazy_static! {
    static ref IDENT_REGEX: Regex = Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

pub const CLIENT_SUFFIX: &str = "Client";
pub const SERVER_SUFFIX: &str = "Server";
pub const SERVICE_SUFFIX: &str = "Service";
pub const SERVICE_DESC_SUFFIX: &str = "_serviceDesc";
pub const HANDLER_SUFFIX: &str = "_Handler";
pub const ASYNC_PREFIX: &str = "Async";

/// Returns `s` with its first character upper-cased.
pub fn export_name(s: &str) -> Result<String> {
    if s.is_empty() {
        return Err(GenerateError::EmptyIdentifier);
    }
    Ok(recase_first(s, true))
}

/// Returns `s` with its first character lower-cased.
pub fn unexport_name(s: &str) -> Result<String> {
    if s.is_empty() {
        return Err(GenerateError::EmptyIdentifier);
    }
    Ok(recase_first(s, false))
}

fn recase_first(s: &str, upper: bool) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn is_go_keyword(s: &str) -> bool {
    GO_KEYWORDS.contains(s)
}

/// A non-empty schema name that is a valid Go identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct Ident(String);

impl Ident {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(GenerateError::EmptyIdentifier);
        }
        if !IDENT_REGEX.is_match(&name) {
            return Err(GenerateError::InvalidIdentifier { name });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn exported(&self) -> String {
        recase_first(&self.0, true)
    }

    pub fn unexported(&self) -> String {
        recase_first(&self.0, false)
    }

    /// Like [`Ident::unexported`], but fails when the result is a Go keyword
    /// and therefore cannot be declared.
    pub fn unexported_checked(&self) -> Result<String> {
        let name = self.unexported();
        if is_go_keyword(&name) {
            return Err(GenerateError::ReservedIdentifier { name });
        }
        Ok(name)
    }
}

impl TryFrom<String> for Ident {
    type Error = GenerateError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Ident {
    type Error = GenerateError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl Deref for Ident {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Composite names. `service` and `method` are raw schema names.

/// `<Service>Client`
pub fn client_interface(service: &Ident) -> String {
    format!("{}{}", service.exported(), CLIENT_SUFFIX)
}

/// `<service>Client`
pub fn client_struct(service: &Ident) -> String {
    format!("{}{}", service.unexported(), CLIENT_SUFFIX)
}

/// `<Service>Server`
pub fn server_interface(service: &Ident) -> String {
    format!("{}{}", service.exported(), SERVER_SUFFIX)
}

/// `<Service>Service`
pub fn service_wrapper(service: &Ident) -> String {
    format!("{}{}", service.exported(), SERVICE_SUFFIX)
}

/// `<Service>_serviceDesc`
pub fn service_desc(service: &Ident) -> String {
    format!("{}{}", service.exported(), SERVICE_DESC_SUFFIX)
}

/// `_<Service>_<Method>_Handler`
pub fn handler(service: &Ident, method: &Ident) -> String {
    format!(
        "_{}_{}{}",
        service.exported(),
        method.exported(),
        HANDLER_SUFFIX
    )
}

/// `Async<Method>`
pub fn async_method(method: &Ident) -> String {
    format!("{}{}", ASYNC_PREFIX, method.exported())
}

/// `<Service>_<Method>Client`, the client stream interface.
pub fn client_stream_interface(service: &Ident, method: &Ident) -> String {
    format!("{}_{}{}", service.exported(), method.exported(), CLIENT_SUFFIX)
}

/// `<service><Method>Client`, the client stream envelope.
pub fn client_stream_struct(service: &Ident, method: &Ident) -> String {
    format!(
        "{}{}{}",
        service.unexported(),
        method.exported(),
        CLIENT_SUFFIX
    )
}

/// `<Service>_<Method>Server`, the server stream interface.
pub fn server_stream_interface(service: &Ident, method: &Ident) -> String {
    format!("{}_{}{}", service.exported(), method.exported(), SERVER_SUFFIX)
}

/// `<service><Method>Server`, the server stream envelope.
pub fn server_stream_struct(service: &Ident, method: &Ident) -> String {
    format!(
        "{}{}{}",
        service.unexported(),
        method.exported(),
        SERVER_SUFFIX
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Ident {
        Ident::new(s).unwrap()
    }

    #[test]
    fn test_export_name() {
        assert_eq!(export_name("echo").unwrap(), "Echo");
        assert_eq!(export_name("Echo").unwrap(), "Echo");
        assert_eq!(export_name("_echo").unwrap(), "_echo");
        assert_eq!(export_name("x").unwrap(), "X");
    }

    #[test]
    fn test_unexport_name() {
        assert_eq!(unexport_name("Echo").unwrap(), "echo");
        assert_eq!(unexport_name("HTTPProxy").unwrap(), "hTTPProxy");
    }

    #[test]
    fn test_export_unexport_are_inverse() {
        for name in ["Foo", "EchoService", "A"].iter() {
            assert_eq!(export_name(&unexport_name(name).unwrap()).unwrap(), *name);
        }
        for name in ["foo", "echoService", "a"].iter() {
            assert_eq!(unexport_name(&export_name(name).unwrap()).unwrap(), *name);
        }
    }

    #[test]
    fn test_empty_name_fails() {
        assert!(matches!(export_name(""), Err(GenerateError::EmptyIdentifier)));
        assert!(matches!(unexport_name(""), Err(GenerateError::EmptyIdentifier)));
        assert!(matches!(Ident::new(""), Err(GenerateError::EmptyIdentifier)));
    }

    #[test]
    fn test_invalid_ident() {
        assert!(matches!(
            Ident::new("1Echo"),
            Err(GenerateError::InvalidIdentifier { name }) if name == "1Echo"
        ));
        assert!(Ident::new("Echo.Say").is_err());
        assert!(Ident::new("Echo_2").is_ok());
    }

    #[test]
    fn test_unexported_keyword() {
        assert!(matches!(
            ident("Func").unexported_checked(),
            Err(GenerateError::ReservedIdentifier { name }) if name == "func"
        ));
        assert_eq!(ident("Echo").unexported_checked().unwrap(), "echo");
    }

    #[test]
    fn test_composite_names() {
        let service = ident("echo");
        let method = ident("say");

        assert_eq!(client_interface(&service), "EchoClient");
        assert_eq!(client_struct(&service), "echoClient");
        assert_eq!(server_interface(&service), "EchoServer");
        assert_eq!(service_wrapper(&service), "EchoService");
        assert_eq!(service_desc(&service), "Echo_serviceDesc");
        assert_eq!(handler(&service, &method), "_Echo_Say_Handler");
        assert_eq!(async_method(&method), "AsyncSay");
        assert_eq!(client_stream_interface(&service, &method), "Echo_SayClient");
        assert_eq!(client_stream_struct(&service, &method), "echoSayClient");
        assert_eq!(server_stream_interface(&service, &method), "Echo_SayServer");
        assert_eq!(server_stream_struct(&service, &method), "echoSayServer");
    }
}
