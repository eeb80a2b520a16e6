//! Generate RPC bindings from a [`FileSchema`]
//!
//! Two independent calling conventions are supported, selected with [`Mode`]:
//!
//! - [`Mode::V1`] interface-based stubs: client and server interfaces, an
//!   asynchronous variant of every unary call, stream envelopes and a
//!   service descriptor consumed by the transport.
//! - [`Mode::V2`] dispatch-table stubs: byte-level client wrappers and a
//!   `Do(function, bytes)` dispatcher registered in a global registry.
//!
//! # Example:
//! Given a file with the following service
//!
//! ```proto
//! service Echo {
//!   rpc Say(EchoRequest) returns (EchoResponse) {}
//! }
//! ```
//! [`Mode::V1`] generates, among others:
//!
//! ```go
//! type EchoClient interface {
//!     Say(in *EchoRequest, opts ...invoker.CallOption) (*EchoResponse, error)
//!     AsyncSay(in *EchoRequest, opts ...invoker.CallOption) *invoker.Call
//! }
//! ```
//!
//! while [`Mode::V2`] generates:
//!
//! ```go
//! func (s *EchoService) Do(function string, reqPBData []byte, sender *kite.Destination) (resPBData []byte, err error) {
//!     switch function {
//!     case "Say":
//!         return s.Say(reqPBData, sender)
//!     default:
//!         err = errors.New("function not found")
//!     }
//!     return
//! }
//! ```

mod signature;
pub mod v1;
pub mod v2;

use crate::{
    config::Config, error::Result, file::FileSchema, printer::Printer, service::ServiceSchema,
};
use derive_more::Display;
use serde::Deserialize;
use tracing::debug;

/// A calling convention able to print the bindings of one service.
pub trait Generator {
    fn mode(&self) -> Mode;

    /// Declarations printed once, before the first service
    fn preamble(&self, _p: &mut Printer) -> Result<()> {
        Ok(())
    }

    /// Print every declaration of `service`
    fn service(&self, file: &FileSchema, service: &ServiceSchema, p: &mut Printer) -> Result<()>;
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[display(fmt = "v1")]
    V1,
    #[display(fmt = "v2")]
    V2,
}

impl Mode {
    pub fn generator<'a>(self, config: &'a Config) -> Box<dyn Generator + 'a> {
        match self {
            Mode::V1 => Box::new(v1::InterfaceGenerator::new(config)),
            Mode::V2 => Box::new(v2::DispatchGenerator::new(config)),
        }
    }
}

/// Declarations of a generated file, without the package clause
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    /// Import specs, sorted by path
    pub imports: Vec<String>,

    pub body: String,
}

/// Generate the declarations of every service of `file`, in schema order.
///
/// Nothing is returned unless every service was printed.
pub fn generate_content(generator: &dyn Generator, file: &FileSchema) -> Result<Content> {
    let mut p = Printer::new(file.go_import_path.clone());

    // both modes declare an unexported per-service locator type
    for service in file.services.iter() {
        p.reserve(&service.name.unexported());
    }

    if !file.services.is_empty() {
        generator.preamble(&mut p)?;
    }

    for service in file.services.iter() {
        debug!(
            file = %file.path,
            service = %service.name,
            methods = service.methods.len(),
            mode = %generator.mode(),
            "generating service"
        );
        generator.service(file, service, &mut p)?;
    }

    let (body, imports) = p.into_parts();
    Ok(Content {
        imports: imports.specs(),
        body,
    })
}

/// A complete generated source file
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    /// File name, the generated name prefix followed by the configured suffix
    pub name: String,

    pub header: String,

    pub package: String,

    pub content: Content,
}

impl GeneratedFile {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("// {}\n\n", self.header));
        out.push_str(&format!("package {}\n\n", self.package));

        if !self.content.imports.is_empty() {
            out.push_str("import (\n");
            for spec in self.content.imports.iter() {
                out.push_str(&format!("\t{}\n", spec));
            }
            out.push_str(")\n\n");
        }

        out.push_str(&self.content.body);
        out
    }
}

/// Generate the bindings file of `file`, or `None` when it declares no service.
pub fn generate_file(file: &FileSchema, mode: Mode, config: &Config) -> Result<Option<GeneratedFile>> {
    if file.services.is_empty() {
        debug!(file = %file.path, "no service, skipping");
        return Ok(None);
    }

    let generator = mode.generator(config);
    let content = generate_content(generator.as_ref(), file)?;

    Ok(Some(GeneratedFile {
        name: format!("{}{}", file.generated_filename_prefix, config.file_suffix),
        header: config.header.clone(),
        package: file.go_package_name.clone(),
        content,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::GenerateError, test_util::*};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_service_no_file() {
        let mut file = echo_file();
        file.services.clear();

        for mode in [Mode::V1, Mode::V2].iter() {
            assert!(generate_file(&file, *mode, &Config::default()).unwrap().is_none());
        }
    }

    #[test]
    fn test_deterministic() {
        let file = mixed_file();
        let config = Config::default();

        for mode in [Mode::V1, Mode::V2].iter() {
            let first = generate_file(&file, *mode, &config).unwrap().unwrap().render();
            let second = generate_file(&file, *mode, &config).unwrap().unwrap().render();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_all_or_nothing() {
        let mut file = mixed_file();
        let last = file.services.len() - 1;
        file.services[last].methods[0].input.go_name.clear();

        for mode in [Mode::V1, Mode::V2].iter() {
            let result = generate_file(&file, *mode, &Config::default());
            assert!(matches!(result, Err(GenerateError::UnresolvedType { .. })));
        }
    }

    #[test]
    fn test_services_in_schema_order() {
        let file = mixed_file();
        let body = generate_file(&file, Mode::V1, &Config::default())
            .unwrap()
            .unwrap()
            .content
            .body;

        let echo = body.find("type EchoServer interface").unwrap();
        let clock = body.find("type ClockServer interface").unwrap();
        assert!(echo < clock);
    }

    #[test]
    fn test_render_v2() {
        let file = echo_file();
        let generated = generate_file(&file, Mode::V2, &Config::default())
            .unwrap()
            .unwrap();

        assert_eq!(generated.name, "echo/echo_kite.pb.go");
        assert_eq!(
            normalize(&generated.render()),
            indoc! {r#"
            // Code generated by protoc-gen-go-kite. DO NOT EDIT.

            package echo

            import (
                "errors"
                "git.dhgames.cn/svr_comm/kite/v2/kite"
                "git.dhgames.cn/svr_comm/kite/v2/server/service"
                "google.golang.org/protobuf/proto"
            )

            // Echo is the client API for Echo service.
            var Echo = &echo{}

            type echo struct {
            }

            // Say echoes the request.
            func (c *echo) Say(destination kite.Destination, request *EchoRequest, opts ...kite.Option) (response *EchoResponse, err error) {
                reqPBData, err := proto.Marshal(request)
                if err != nil {
                    return nil, err
                }
                resPBData, err := kite.Invoke(destination, "echo", "Echo", "Say", reqPBData, opts...)
                if err != nil {
                    return nil, err
                }
                response = new(EchoResponse)
                err = proto.Unmarshal(resPBData, response)
                return
            }

            // EchoServer is the server API for Echo service.
            type EchoServer interface {
                // Say echoes the request.
                Say(*EchoRequest, *kite.Destination) (*EchoResponse, error)
            }

            type EchoService struct {
                handle EchoServer
            }

            func RegEchoServer(handle EchoServer) {
                service.Dispatch.Add("echo", "Echo", &EchoService{handle: handle})
            }

            func (s *EchoService) Do(function string, reqPBData []byte, sender *kite.Destination) (resPBData []byte, err error) {
                switch function {
                case "Say":
                    return s.Say(reqPBData, sender)
                default:
                    err = errors.New("function not found")
                }
                return
            }

            func (s *EchoService) Say(reqPBData []byte, sender *kite.Destination) (resPBData []byte, err error) {
                req := new(EchoRequest)
                if err = proto.Unmarshal(reqPBData, req); err != nil {
                    return nil, err
                }
                var res *EchoResponse
                res, err = s.handle.Say(req, sender)
                if err == nil {
                    resPBData, err = proto.Marshal(res)
                }
                return
            }

            "#}
        );
    }

    #[test]
    fn test_service_names_shadowing_packages() {
        let v1 = generate_file(
            &file_with(service("Kite", vec![method("Get", "GetRequest", "GetResponse")])),
            Mode::V1,
            &Config::default(),
        )
        .unwrap()
        .unwrap();
        assert!(v1
            .content
            .imports
            .contains(&"kite1 \"git.dhgames.cn/svr_comm/kite\"".to_string()));
        assert!(v1.content.body.contains("var Kite = &kite{}"));
        assert!(v1
            .content
            .body
            .contains("func GetKiteClient(serviceInfo kite1.ServiceInfo) KiteClient {"));

        let v2 = generate_file(
            &file_with(service("Proto", vec![method("Get", "GetRequest", "GetResponse")])),
            Mode::V2,
            &Config::default(),
        )
        .unwrap()
        .unwrap();
        assert!(v2
            .content
            .imports
            .contains(&"proto1 \"google.golang.org/protobuf/proto\"".to_string()));
        assert!(v2.content.body.contains("reqPBData, err := proto1.Marshal(request)"));
    }

    #[test]
    fn test_mode_from_json() {
        let mode: Mode = serde_json::from_str("\"v2\"").unwrap();
        assert_eq!(mode, Mode::V2);
        assert_eq!(mode.to_string(), "v2");
    }
}
