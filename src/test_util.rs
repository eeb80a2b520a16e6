use crate::{
    file::FileSchema,
    go_type::GoIdent,
    ident::Ident,
    service::{MethodSchema, ServiceSchema},
};

pub fn method(name: &str, input: &str, output: &str) -> MethodSchema {
    MethodSchema::new(
        Ident::new(name).unwrap(),
        GoIdent::local(input),
        GoIdent::local(output),
    )
}

/// A method named `name` exchanging `<name>Request` and `<name>Response`
pub fn streaming_method(name: &str, client: bool, server: bool) -> MethodSchema {
    let mut m = method(name, &format!("{}Request", name), &format!("{}Response", name));
    m.client_streaming = client;
    m.server_streaming = server;
    m
}

pub fn service(name: &str, methods: Vec<MethodSchema>) -> ServiceSchema {
    let mut service = ServiceSchema::new(Ident::new(name).unwrap());
    for m in methods {
        service.add_method(m);
    }
    service
}

/// A file holding `service`, named after it
pub fn file_with(service: ServiceSchema) -> FileSchema {
    let name = service.name.unexported();
    FileSchema {
        path: format!("{}/{}.proto", name, name),
        package: name.clone(),
        go_package_name: name.clone(),
        go_import_path: Some(format!("example.com/{}", name)),
        generated_filename_prefix: format!("{}/{}", name, name),
        services: vec![service],
    }
}

/// `service Echo { rpc Say(EchoRequest) returns (EchoResponse); }`
pub fn echo_file() -> FileSchema {
    let mut say = method("Say", "EchoRequest", "EchoResponse");
    say.comments = Some(" Say echoes the request.\n".into());
    file_with(service("Echo", vec![say]))
}

/// Echo with a unary `Get` and a server-streaming `Watch`
pub fn echo_watch_service() -> ServiceSchema {
    service(
        "Echo",
        vec![
            method("Get", "GetRequest", "GetResponse"),
            streaming_method("Watch", false, true),
        ],
    )
}

/// One method of every shape
pub fn bidi_service() -> ServiceSchema {
    service(
        "Transfer",
        vec![
            method("Ping", "PingRequest", "PingResponse"),
            streaming_method("Upload", true, false),
            streaming_method("Download", false, true),
            streaming_method("Sync", true, true),
        ],
    )
}

/// Echo followed by a Clock service mixing unary and streaming methods
pub fn mixed_file() -> FileSchema {
    let mut file = echo_file();
    file.services.push(service(
        "Clock",
        vec![
            method("Now", "NowRequest", "NowResponse"),
            streaming_method("Tick", false, true),
        ],
    ));
    file
}

/// Replace tabs so generated Go can be compared against indented literals
pub fn normalize(s: &str) -> String {
    s.replace('\t', "    ")
}
