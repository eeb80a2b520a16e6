//! Interface-based stubs.
//!
//! Per service, in order: the client interface and its implementation
//! (including stream envelopes), package-level wrappers resolving a client
//! through the service locator, the server interface, registration
//! functions, server handlers and the service descriptor.

use super::{
    signature::{self, ClientParams},
    Generator, Mode,
};
use crate::{
    config::{Config, V1Packages},
    error::{GenerateError, Result},
    file::FileSchema,
    ident,
    printer::Printer,
    service::{MethodRef, ServiceSchema},
};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Fail when the asynchronous variant of a unary method collides with another
/// method of the client interface, e.g. `Get` next to `AsyncGet`.
pub fn check_async_names(service: &ServiceSchema) -> Result<()> {
    let names = service
        .methods()
        .map(|method| method.name.exported())
        .collect::<HashSet<_>>();

    for method in service.unary_methods() {
        let name = ident::async_method(&method.name);
        if names.contains(&name) {
            return Err(GenerateError::ReservedIdentifier { name });
        }
    }
    Ok(())
}

pub struct InterfaceGenerator<'a> {
    packages: &'a V1Packages,
    emit_reference_imports: bool,
}

impl<'a> InterfaceGenerator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            packages: &config.v1,
            emit_reference_imports: config.emit_reference_imports,
        }
    }

    fn invoker(&self, p: &mut Printer, name: &str) -> String {
        p.ident(&self.packages.invoker, name)
    }

    fn client_params(&self, p: &mut Printer, routing: bool) -> ClientParams {
        ClientParams {
            routing: match routing {
                true => Some(format!(
                    "serviceInfo {}",
                    p.ident(&self.packages.kite, "ServiceInfo")
                )),
                false => None,
            },
            request: "in",
            options: self.invoker(p, "CallOption"),
        }
    }

    /// The name the transport addresses a method by: `<file>/<package>.<Service>/<Method>`
    fn full_method_name(file: &FileSchema, method: MethodRef) -> String {
        format!(
            "{}/{}/{}",
            file.base_name(),
            file.service_full_name(method.service),
            method.name
        )
    }

    fn client_interface(&self, p: &mut Printer, service: &ServiceSchema) -> Result<()> {
        let client_name = ident::client_interface(&service.name);
        let params = self.client_params(p, false);
        let call = self.invoker(p, "Call");

        p.doc(
            &format!("{} is the client API for {} service.", client_name, service.name),
            service.comments.as_ref(),
            service.deprecated,
        );
        emit_and_indent!(p, "type {} interface {{", client_name);
        for method in service.methods() {
            p.deprecated(method.deprecated);
            p.comment(method.comments.as_ref());
            let sig = signature::client(p, method, &params)?;
            emit!(p, &sig);

            if method.shape().is_unary() {
                p.comment(method.comments.as_ref());
                let sig = signature::client_async(p, method, &params, &call)?;
                emit!(p, &sig);
            }
        }
        outdent_and_emit!(p, "}");
        p.blank_line();
        Ok(())
    }

    fn client_constructors(&self, p: &mut Printer, service: &ServiceSchema) {
        let client_name = ident::client_interface(&service.name);
        let client_struct = ident::client_struct(&service.name);
        let conn = self.invoker(p, "IClient");

        emit_and_indent!(p, "type {} struct {{", client_struct);
        emit!(p, "cc {}", conn);
        outdent_and_emit!(p, "}");
        p.blank_line();

        p.deprecated(service.deprecated);
        emit_and_indent!(p, "func New{}(cc {}) {} {{", client_name, conn, client_name);
        emit!(p, "return &{}{{cc}}", client_struct);
        outdent_and_emit!(p, "}");
        p.blank_line();

        let info = p.ident(&self.packages.kite, "ServiceInfo");
        let get_client = p.ident(&self.packages.client, "GetClient");
        p.deprecated(service.deprecated);
        emit_and_indent!(
            p,
            "func Get{}(serviceInfo {}) {} {{",
            client_name,
            info,
            client_name
        );
        emit!(p, "return &{}{{{}(serviceInfo)}}", client_struct, get_client);
        outdent_and_emit!(p, "}");
        p.blank_line();
    }

    fn client_method(
        &self,
        p: &mut Printer,
        file: &FileSchema,
        method: MethodRef,
        stream_index: Option<usize>,
    ) -> Result<()> {
        let client_struct = ident::client_struct(&method.service.name);
        let full_name = Self::full_method_name(file, method);
        let params = self.client_params(p, false);

        p.deprecated(method.deprecated);
        let sig = signature::client(p, method, &params)?;
        emit_and_indent!(p, "func (c *{}) {} {{", client_struct, sig);

        let stream_index = match stream_index {
            None => {
                let output = p.output(method)?;
                emit!(p, "out := new({})", output);
                emit!(p, "err := c.cc.Invoke(\"{}\", in, out, opts...)", full_name);
                emit_and_indent!(p, "if err != nil {");
                emit!(p, "return nil, err");
                outdent_and_emit!(p, "}");
                emit!(p, "return out, nil");
                outdent_and_emit!(p, "}");
                p.blank_line();

                let call = self.invoker(p, "Call");
                p.deprecated(method.deprecated);
                let sig = signature::client_async(p, method, &params, &call)?;
                emit_and_indent!(p, "func (c *{}) {} {{", client_struct, sig);
                emit!(p, "out := new({})", output);
                emit!(p, "return c.cc.AsyncInvoke(\"{}\", in, out, opts...)", full_name);
                outdent_and_emit!(p, "}");
                p.blank_line();
                return Ok(());
            }
            Some(index) => index,
        };

        let shape = method.shape();
        let stream_struct = ident::client_stream_struct(&method.service.name, &method.name);
        emit!(
            p,
            "stream, err := c.cc.NewStream(&{}.Streams[{}], \"{}\", opts...)",
            ident::service_desc(&method.service.name),
            stream_index,
            full_name
        );
        emit_and_indent!(p, "if err != nil {");
        emit!(p, "return nil, err");
        outdent_and_emit!(p, "}");
        emit!(p, "x := &{}{{stream}}", stream_struct);
        if !shape.client_streams() {
            emit_and_indent!(p, "if err := x.ClientStream.SendMsg(in); err != nil {");
            emit!(p, "return nil, err");
            outdent_and_emit!(p, "}");
            emit_and_indent!(p, "if err := x.ClientStream.CloseSend(); err != nil {");
            emit!(p, "return nil, err");
            outdent_and_emit!(p, "}");
        }
        emit!(p, "return x, nil");
        outdent_and_emit!(p, "}");
        p.blank_line();

        self.client_stream(p, method)
    }

    /// Client stream envelope: Send when the client streams, Recv when the
    /// server streams, CloseAndRecv when only the client streams.
    fn client_stream(&self, p: &mut Printer, method: MethodRef) -> Result<()> {
        let shape = method.shape();
        let input = p.input(method)?;
        let output = p.output(method)?;
        let client_stream = self.invoker(p, "ClientStream");
        let stream_struct = ident::client_stream_struct(&method.service.name, &method.name);

        let gen_send = shape.client_streams();
        let gen_recv = shape.server_streams();
        let gen_close_and_recv = !shape.server_streams();

        emit_and_indent!(
            p,
            "type {} interface {{",
            ident::client_stream_interface(&method.service.name, &method.name)
        );
        if gen_send {
            emit!(p, "Send(*{}) error", input);
        }
        if gen_recv {
            emit!(p, "Recv() (*{}, error)", output);
        }
        if gen_close_and_recv {
            emit!(p, "CloseAndRecv() (*{}, error)", output);
        }
        emit!(p, &client_stream);
        outdent_and_emit!(p, "}");
        p.blank_line();

        emit_and_indent!(p, "type {} struct {{", stream_struct);
        emit!(p, &client_stream);
        outdent_and_emit!(p, "}");
        p.blank_line();

        if gen_send {
            emit_and_indent!(p, "func (x *{}) Send(m *{}) error {{", stream_struct, input);
            emit!(p, "return x.ClientStream.SendMsg(m)");
            outdent_and_emit!(p, "}");
            p.blank_line();
        }
        if gen_recv {
            emit_and_indent!(p, "func (x *{}) Recv() (*{}, error) {{", stream_struct, output);
            emit!(p, "m := new({})", output);
            emit_and_indent!(p, "if err := x.ClientStream.RecvMsg(m); err != nil {");
            emit!(p, "return nil, err");
            outdent_and_emit!(p, "}");
            emit!(p, "return m, nil");
            outdent_and_emit!(p, "}");
            p.blank_line();
        }
        if gen_close_and_recv {
            emit_and_indent!(
                p,
                "func (x *{}) CloseAndRecv() (*{}, error) {{",
                stream_struct,
                output
            );
            emit_and_indent!(p, "if err := x.ClientStream.CloseSend(); err != nil {");
            emit!(p, "return nil, err");
            outdent_and_emit!(p, "}");
            emit!(p, "m := new({})", output);
            emit_and_indent!(p, "if err := x.ClientStream.RecvMsg(m); err != nil {");
            emit!(p, "return nil, err");
            outdent_and_emit!(p, "}");
            emit!(p, "return m, nil");
            outdent_and_emit!(p, "}");
            p.blank_line();
        }
        Ok(())
    }

    /// Package-level singleton whose methods resolve a client through the
    /// service locator before delegating to it.
    fn locator_wrappers(&self, p: &mut Printer, service: &ServiceSchema) -> Result<()> {
        let locator = service.name.unexported_checked()?;
        let client_struct = ident::client_struct(&service.name);
        let get_client = p.ident(&self.packages.client, "GetClient");
        let params = self.client_params(p, true);
        let call = self.invoker(p, "Call");

        emit!(p, "var {} = &{}{{}}", service.name.exported(), locator);
        p.blank_line();
        emit_and_indent!(p, "type {} struct {{", locator);
        outdent_and_emit!(p, "}");
        p.blank_line();

        for method in service.methods() {
            let args = match method.shape().client_streams() {
                true => "opts...",
                false => "in, opts...",
            };

            p.deprecated(method.deprecated);
            let sig = signature::client(p, method, &params)?;
            emit_and_indent!(p, "func (c *{}) {} {{", locator, sig);
            emit!(p, "cli := &{}{{{}(serviceInfo)}}", client_struct, get_client);
            emit!(p, "return cli.{}({})", method.name.exported(), args);
            outdent_and_emit!(p, "}");
            p.blank_line();

            if method.shape().is_unary() {
                p.deprecated(method.deprecated);
                let sig = signature::client_async(p, method, &params, &call)?;
                emit_and_indent!(p, "func (c *{}) {} {{", locator, sig);
                emit!(p, "cli := &{}{{{}(serviceInfo)}}", client_struct, get_client);
                emit!(p, "return cli.{}({})", ident::async_method(&method.name), args);
                outdent_and_emit!(p, "}");
                p.blank_line();
            }
        }
        Ok(())
    }

    fn server_interface(&self, p: &mut Printer, service: &ServiceSchema) -> Result<()> {
        let server_type = ident::server_interface(&service.name);

        p.doc(
            &format!("{} is the server API for {} service.", server_type, service.name),
            service.comments.as_ref(),
            service.deprecated,
        );
        emit_and_indent!(p, "type {} interface {{", server_type);
        for method in service.methods() {
            p.deprecated(method.deprecated);
            p.comment(method.comments.as_ref());
            let sig = signature::server(p, method, None)?;
            emit!(p, &sig);
        }
        outdent_and_emit!(p, "}");
        p.blank_line();
        Ok(())
    }

    fn registration(&self, p: &mut Printer, service: &ServiceSchema) {
        let server_type = ident::server_interface(&service.name);
        let service_desc = ident::service_desc(&service.name);
        let server = self.invoker(p, "Server");
        let stub = self.invoker(p, "Stub");
        let name = service.name.exported();

        p.deprecated(service.deprecated);
        emit_and_indent!(
            p,
            "func Register{}Server(s *{}, srv {}) {{",
            name,
            server,
            server_type
        );
        emit!(p, "s.RegisterService(&{}, srv)", service_desc);
        outdent_and_emit!(p, "}");
        p.blank_line();

        p.deprecated(service.deprecated);
        emit_and_indent!(p, "func Reg{}Server(srv {}) {} {{", name, server_type, stub);
        emit_and_indent!(p, "return {}{{", stub);
        emit!(p, "SD: &{},", service_desc);
        emit!(p, "SS: srv,");
        outdent_and_emit!(p, "}");
        outdent_and_emit!(p, "}");
        p.blank_line();
    }

    /// Server handler adapting the transport's calling convention to the server interface.
    fn server_method(&self, p: &mut Printer, method: MethodRef) -> Result<String> {
        let shape = method.shape();
        let handler = ident::handler(&method.service.name, &method.name);
        let server_type = ident::server_interface(&method.service.name);
        let name = method.name.exported();
        let input = p.input(method)?;

        if shape.is_unary() {
            emit_and_indent!(
                p,
                "func {}(srv interface{{}}, dec func(interface{{}}) error) (interface{{}}, error) {{",
                handler
            );
            emit!(p, "in := new({})", input);
            emit_and_indent!(p, "if err := dec(in); err != nil {");
            emit!(p, "return nil, err");
            outdent_and_emit!(p, "}");
            emit!(p, "return srv.({}).{}(in)", server_type, name);
            outdent_and_emit!(p, "}");
            p.blank_line();
            return Ok(handler);
        }

        let server_stream = self.invoker(p, "ServerStream");
        let stream_struct = ident::server_stream_struct(&method.service.name, &method.name);
        emit_and_indent!(
            p,
            "func {}(srv interface{{}}, stream {}) error {{",
            handler,
            server_stream
        );
        if !shape.client_streams() {
            emit!(p, "m := new({})", input);
            emit_and_indent!(p, "if err := stream.RecvMsg(m); err != nil {");
            emit!(p, "return err");
            outdent_and_emit!(p, "}");
            emit!(
                p,
                "return srv.({}).{}(m, &{}{{stream}})",
                server_type,
                name,
                stream_struct
            );
        } else {
            emit!(
                p,
                "return srv.({}).{}(&{}{{stream}})",
                server_type,
                name,
                stream_struct
            );
        }
        outdent_and_emit!(p, "}");
        p.blank_line();

        self.server_stream(p, method)?;
        Ok(handler)
    }

    /// Server stream envelope: Send when the server streams, SendAndClose
    /// otherwise, Recv when the client streams.
    fn server_stream(&self, p: &mut Printer, method: MethodRef) -> Result<()> {
        let shape = method.shape();
        let input = p.input(method)?;
        let output = p.output(method)?;
        let server_stream = self.invoker(p, "ServerStream");
        let stream_struct = ident::server_stream_struct(&method.service.name, &method.name);

        let gen_send = shape.server_streams();
        let gen_send_and_close = !shape.server_streams();
        let gen_recv = shape.client_streams();

        emit_and_indent!(
            p,
            "type {} interface {{",
            ident::server_stream_interface(&method.service.name, &method.name)
        );
        if gen_send {
            emit!(p, "Send(*{}) error", output);
        }
        if gen_send_and_close {
            emit!(p, "SendAndClose(*{}) error", output);
        }
        if gen_recv {
            emit!(p, "Recv() (*{}, error)", input);
        }
        emit!(p, &server_stream);
        outdent_and_emit!(p, "}");
        p.blank_line();

        emit_and_indent!(p, "type {} struct {{", stream_struct);
        emit!(p, &server_stream);
        outdent_and_emit!(p, "}");
        p.blank_line();

        if gen_send {
            emit_and_indent!(p, "func (x *{}) Send(m *{}) error {{", stream_struct, output);
            emit!(p, "return x.ServerStream.SendMsg(m)");
            outdent_and_emit!(p, "}");
            p.blank_line();
        }
        if gen_send_and_close {
            emit_and_indent!(
                p,
                "func (x *{}) SendAndClose(m *{}) error {{",
                stream_struct,
                output
            );
            emit!(p, "return x.ServerStream.SendMsg(m)");
            outdent_and_emit!(p, "}");
            p.blank_line();
        }
        if gen_recv {
            emit_and_indent!(p, "func (x *{}) Recv() (*{}, error) {{", stream_struct, input);
            emit!(p, "m := new({})", input);
            emit_and_indent!(p, "if err := x.ServerStream.RecvMsg(m); err != nil {");
            emit!(p, "return nil, err");
            outdent_and_emit!(p, "}");
            emit!(p, "return m, nil");
            outdent_and_emit!(p, "}");
            p.blank_line();
        }
        Ok(())
    }

    /// Service descriptor: unary methods are looked up by name in `Methods`,
    /// streaming methods are reached through their `Streams` entry.
    fn service_desc(
        &self,
        p: &mut Printer,
        file: &FileSchema,
        service: &ServiceSchema,
        handlers: &HashMap<&str, String>,
    ) {
        let service_desc = self.invoker(p, "ServiceDesc");
        let method_desc = self.invoker(p, "MethodDesc");
        let stream_desc = self.invoker(p, "StreamDesc");

        emit_and_indent!(
            p,
            "var {} = {}{{",
            ident::service_desc(&service.name),
            service_desc
        );
        emit!(p, "ServiceName: \"{}\",", file.service_full_name(service));
        emit!(
            p,
            "HandlerType: (*{})(nil),",
            ident::server_interface(&service.name)
        );

        emit_and_indent!(p, "Methods: []{}{{", method_desc);
        for method in service.unary_methods() {
            emit_and_indent!(p, "{");
            emit!(p, "MethodName: \"{}\",", method.name);
            emit!(p, "Handler: {},", handlers[method.name.as_str()]);
            outdent_and_emit!(p, "},");
        }
        outdent_and_emit!(p, "},");

        emit_and_indent!(p, "Streams: []{}{{", stream_desc);
        for method in service.streaming_methods() {
            let shape = method.shape();
            emit_and_indent!(p, "{");
            emit!(p, "StreamName: \"{}\",", method.name);
            emit!(p, "Handler: {},", handlers[method.name.as_str()]);
            if shape.server_streams() {
                emit!(p, "ServerStreams: true,");
            }
            if shape.client_streams() {
                emit!(p, "ClientStreams: true,");
            }
            outdent_and_emit!(p, "},");
        }
        outdent_and_emit!(p, "},");

        emit!(p, "Metadata: \"{}\",", file.path);
        outdent_and_emit!(p, "}");
        p.blank_line();
    }
}

impl<'a> Generator for InterfaceGenerator<'a> {
    fn mode(&self) -> Mode {
        Mode::V1
    }

    fn preamble(&self, p: &mut Printer) -> Result<()> {
        if !self.emit_reference_imports {
            return Ok(());
        }

        let client = self.invoker(p, "IClient");
        let version = self.invoker(p, "SupportPackageIsVersion6");
        emit!(p, "// Reference imports to suppress errors if they are not otherwise used.");
        emit!(p, "var _ {}", client);
        p.blank_line();
        emit!(p, "// This is a compile-time assertion to ensure that this generated file");
        emit!(p, "// is compatible with the kite package it is being compiled against.");
        emit!(p, "const _ = {}", version);
        p.blank_line();
        Ok(())
    }

    fn service(&self, file: &FileSchema, service: &ServiceSchema, p: &mut Printer) -> Result<()> {
        check_async_names(service)?;
        self.client_interface(p, service)?;
        self.client_constructors(p, service);

        // streaming methods index into the descriptor's Streams in schema order
        let mut stream_index = 0;
        for method in service.methods() {
            trace!(service = %service.name, method = %method.name, shape = %method.shape());
            let index = match method.shape().is_unary() {
                true => None,
                false => {
                    stream_index += 1;
                    Some(stream_index - 1)
                }
            };
            self.client_method(p, file, method, index)?;
        }

        self.locator_wrappers(p, service)?;
        self.server_interface(p, service)?;
        self.registration(p, service);

        let mut handlers = HashMap::new();
        for method in service.methods() {
            let handler = self.server_method(p, method)?;
            handlers.insert(method.method.name.as_str(), handler);
        }

        self.service_desc(p, file, service, &handlers);
        Ok(())
    }
}
