//! Method signatures shared by the generators.

use crate::{error::Result, ident, printer::Printer, service::MethodRef};

/// Parameters preceding the variadic call options of a client method
pub(super) struct ClientParams {
    /// Routing parameter placed first, e.g. `serviceInfo kite.ServiceInfo`
    pub routing: Option<String>,

    /// Name of the request parameter
    pub request: &'static str,

    /// Type of the variadic options, e.g. `invoker.CallOption`
    pub options: String,
}

impl ClientParams {
    /// Parameter list of a client method; client-streaming methods take no request.
    fn render(&self, p: &mut Printer, method: MethodRef) -> Result<String> {
        let mut params = Vec::new();
        if let Some(routing) = &self.routing {
            params.push(routing.clone());
        }
        if !method.shape().client_streams() {
            params.push(format!("{} *{}", self.request, p.input(method)?));
        }
        params.push(format!("opts ...{}", self.options));
        Ok(params.join(", "))
    }
}

/// `Say(in *EchoRequest, opts ...) (*EchoResponse, error)`, streaming methods
/// return their client stream interface instead of a response.
pub(super) fn client(p: &mut Printer, method: MethodRef, params: &ClientParams) -> Result<String> {
    let params = params.render(p, method)?;
    let ret = match method.shape().is_unary() {
        true => format!("*{}", p.output(method)?),
        false => ident::client_stream_interface(&method.service.name, &method.name),
    };
    Ok(format!("{}({}) ({}, error)", method.name.exported(), params, ret))
}

/// `AsyncSay(in *EchoRequest, opts ...) *invoker.Call`
pub(super) fn client_async(
    p: &mut Printer,
    method: MethodRef,
    params: &ClientParams,
    call: &str,
) -> Result<String> {
    let params = params.render(p, method)?;
    Ok(format!(
        "{}({}) *{}",
        ident::async_method(&method.name),
        params,
        call
    ))
}

/// `Say(destination kite.Destination, request *EchoRequest, opts ...) (response *EchoResponse, err error)`
pub(super) fn client_named_results(
    p: &mut Printer,
    method: MethodRef,
    params: &ClientParams,
) -> Result<String> {
    let params = params.render(p, method)?;
    Ok(format!(
        "{}({}) (response *{}, err error)",
        method.name.exported(),
        params,
        p.output(method)?
    ))
}

/// `Say(*EchoRequest) (*EchoResponse, error)` or `Watch(*WatchRequest, Echo_WatchServer) error`.
///
/// `sender` is appended as the last parameter when set.
pub(super) fn server(p: &mut Printer, method: MethodRef, sender: Option<&str>) -> Result<String> {
    let shape = method.shape();
    let mut params = Vec::new();

    if !shape.client_streams() {
        params.push(format!("*{}", p.input(method)?));
    }
    if shape.is_streaming() {
        params.push(ident::server_stream_interface(
            &method.service.name,
            &method.name,
        ));
    }
    if let Some(sender) = sender {
        params.push(sender.to_string());
    }

    let ret = match shape.is_unary() {
        true => format!("(*{}, error)", p.output(method)?),
        false => "error".to_string(),
    };
    Ok(format!("{}({}) {}", method.name.exported(), params.join(", "), ret))
}
