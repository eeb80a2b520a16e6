//! Dispatch-table stubs.
//!
//! Clients marshal requests themselves and address the remote service by
//! (file, service, method) names; servers are reached through a single
//! `Do(function, bytes)` entry point registered in a global registry.
//!
//! Only unary methods get a client wrapper, a dispatcher case and a byte-level
//! adapter. Streaming methods still appear in the server interface, with the
//! same stream-handle parameter as interface-based stubs, but nothing is
//! generated to call or serve them.

use super::{
    signature::{self, ClientParams},
    Generator, Mode,
};
use crate::{
    config::{Config, V2Packages},
    error::{GenerateError, Result},
    file::FileSchema,
    ident,
    printer::Printer,
    service::{MethodRef, ServiceSchema},
};
use linked_hash_map::LinkedHashMap;
use tracing::{trace, warn};

/// Name of the generated dispatcher method on the service wrapper
pub const DISPATCH_METHOD: &str = "Do";

/// Error message returned by the generated dispatcher for unknown functions
pub const FUNCTION_NOT_FOUND: &str = "function not found";

pub struct DispatchGenerator<'a> {
    packages: &'a V2Packages,
}

/// Literal function name => adapter method, in schema order
pub type DispatchPlan<'s> = LinkedHashMap<&'s str, String>;

/// Build the dispatcher's name lookup for the unary methods of `service`.
pub fn dispatch_plan(service: &ServiceSchema) -> Result<DispatchPlan<'_>> {
    let mut plan = LinkedHashMap::new();
    for method in service.unary_methods() {
        let adapter = method.name.exported();
        if adapter == DISPATCH_METHOD {
            return Err(GenerateError::ReservedIdentifier { name: adapter });
        }
        plan.insert(method.method.name.as_str(), adapter);
    }
    Ok(plan)
}

impl<'a> DispatchGenerator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            packages: &config.v2,
        }
    }

    fn kite(&self, p: &mut Printer, name: &str) -> String {
        p.ident(&self.packages.kite, name)
    }

    fn client(&self, p: &mut Printer, file: &FileSchema, service: &ServiceSchema) -> Result<()> {
        let locator = service.name.unexported_checked()?;
        let name = service.name.exported();

        p.doc(
            &format!("{} is the client API for {} service.", name, service.name),
            service.comments.as_ref(),
            service.deprecated,
        );
        emit!(p, "var {} = &{}{{}}", name, locator);
        p.blank_line();
        emit_and_indent!(p, "type {} struct {{", locator);
        outdent_and_emit!(p, "}");
        p.blank_line();

        for method in service.methods() {
            trace!(service = %service.name, method = %method.name, shape = %method.shape());
            match method.shape().is_unary() {
                true => self.client_method(p, file, method, &locator)?,
                false => warn!(
                    service = %service.name,
                    method = %method.name,
                    shape = %method.shape(),
                    "streaming methods get no client wrapper"
                ),
            }
        }
        Ok(())
    }

    fn client_method(
        &self,
        p: &mut Printer,
        file: &FileSchema,
        method: MethodRef,
        locator: &str,
    ) -> Result<()> {
        let params = ClientParams {
            routing: Some(format!("destination {}", self.kite(p, "Destination"))),
            request: "request",
            options: self.kite(p, "Option"),
        };
        let marshal = p.ident(&self.packages.proto, "Marshal");
        let unmarshal = p.ident(&self.packages.proto, "Unmarshal");
        let invoke = self.kite(p, "Invoke");
        let output = p.output(method)?;

        p.deprecated(method.deprecated);
        p.comment(method.comments.as_ref());
        let sig = signature::client_named_results(p, method, &params)?;
        emit_and_indent!(p, "func (c *{}) {} {{", locator, sig);
        emit!(p, "reqPBData, err := {}(request)", marshal);
        emit_and_indent!(p, "if err != nil {");
        emit!(p, "return nil, err");
        outdent_and_emit!(p, "}");
        emit!(
            p,
            "resPBData, err := {}(destination, \"{}\", \"{}\", \"{}\", reqPBData, opts...)",
            invoke,
            file.base_name(),
            method.service.name.exported(),
            method.name
        );
        emit_and_indent!(p, "if err != nil {");
        emit!(p, "return nil, err");
        outdent_and_emit!(p, "}");
        emit!(p, "response = new({})", output);
        emit!(p, "err = {}(resPBData, response)", unmarshal);
        emit!(p, "return");
        outdent_and_emit!(p, "}");
        p.blank_line();
        Ok(())
    }

    /// Server interface; every method takes the sender as last parameter.
    fn server_interface(&self, p: &mut Printer, service: &ServiceSchema) -> Result<()> {
        let server_type = ident::server_interface(&service.name);
        let sender = format!("*{}", self.kite(p, "Destination"));

        p.doc(
            &format!("{} is the server API for {} service.", server_type, service.name),
            service.comments.as_ref(),
            service.deprecated,
        );
        emit_and_indent!(p, "type {} interface {{", server_type);
        for method in service.methods() {
            p.deprecated(method.deprecated);
            p.comment(method.comments.as_ref());
            let sig = signature::server(p, method, Some(&sender))?;
            emit!(p, &sig);
        }
        outdent_and_emit!(p, "}");
        p.blank_line();
        Ok(())
    }

    fn registration(&self, p: &mut Printer, file: &FileSchema, service: &ServiceSchema) {
        let server_type = ident::server_interface(&service.name);
        let wrapper = ident::service_wrapper(&service.name);
        let dispatch = p.ident(&self.packages.service, "Dispatch");

        emit_and_indent!(p, "type {} struct {{", wrapper);
        emit!(p, "handle {}", server_type);
        outdent_and_emit!(p, "}");
        p.blank_line();

        p.deprecated(service.deprecated);
        emit_and_indent!(
            p,
            "func Reg{}Server(handle {}) {{",
            service.name.exported(),
            server_type
        );
        emit!(
            p,
            "{}.Add(\"{}\", \"{}\", &{}{{handle: handle}})",
            dispatch,
            file.base_name(),
            service.name.exported(),
            wrapper
        );
        outdent_and_emit!(p, "}");
        p.blank_line();
    }

    fn dispatcher(&self, p: &mut Printer, service: &ServiceSchema, plan: &DispatchPlan) {
        let wrapper = ident::service_wrapper(&service.name);
        let sender = self.kite(p, "Destination");
        let new_error = p.ident(&self.packages.errors, "New");

        emit_and_indent!(
            p,
            "func (s *{}) {}(function string, reqPBData []byte, sender *{}) (resPBData []byte, err error) {{",
            wrapper,
            DISPATCH_METHOD,
            sender
        );
        emit!(p, "switch function {");
        for (function, adapter) in plan.iter() {
            emit!(p, "case \"{}\":", function);
            p.indent();
            emit!(p, "return s.{}(reqPBData, sender)", adapter);
            p.outdent();
        }
        emit!(p, "default:");
        p.indent();
        emit!(p, "err = {}(\"{}\")", new_error, FUNCTION_NOT_FOUND);
        p.outdent();
        emit!(p, "}");
        emit!(p, "return");
        outdent_and_emit!(p, "}");
        p.blank_line();
    }

    /// Byte-level adapter: decode the request, call the server, encode the
    /// response only when the call succeeded.
    fn adapter(&self, p: &mut Printer, method: MethodRef, adapter: &str) -> Result<()> {
        let wrapper = ident::service_wrapper(&method.service.name);
        let sender = self.kite(p, "Destination");
        let marshal = p.ident(&self.packages.proto, "Marshal");
        let unmarshal = p.ident(&self.packages.proto, "Unmarshal");
        let input = p.input(method)?;
        let output = p.output(method)?;

        emit_and_indent!(
            p,
            "func (s *{}) {}(reqPBData []byte, sender *{}) (resPBData []byte, err error) {{",
            wrapper,
            adapter,
            sender
        );
        emit!(p, "req := new({})", input);
        emit_and_indent!(p, "if err = {}(reqPBData, req); err != nil {{", unmarshal);
        emit!(p, "return nil, err");
        outdent_and_emit!(p, "}");
        emit!(p, "var res *{}", output);
        emit!(p, "res, err = s.handle.{}(req, sender)", method.name.exported());
        emit_and_indent!(p, "if err == nil {");
        emit!(p, "resPBData, err = {}(res)", marshal);
        outdent_and_emit!(p, "}");
        emit!(p, "return");
        outdent_and_emit!(p, "}");
        p.blank_line();
        Ok(())
    }
}

impl<'a> Generator for DispatchGenerator<'a> {
    fn mode(&self) -> Mode {
        Mode::V2
    }

    fn service(&self, file: &FileSchema, service: &ServiceSchema, p: &mut Printer) -> Result<()> {
        let plan = dispatch_plan(service)?;

        self.client(p, file, service)?;
        self.server_interface(p, service)?;
        self.registration(p, file, service);
        self.dispatcher(p, service, &plan);

        for method in service.unary_methods() {
            self.adapter(p, method, &plan[method.method.name.as_str()])?;
        }
        Ok(())
    }
}
