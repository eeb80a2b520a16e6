use crate::service::MethodSchema;
use derive_more::Display;

/// How requests and responses of a method travel over the wire.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallShape {
    #[display(fmt = "unary")]
    Unary,
    #[display(fmt = "client-streaming")]
    ClientStreaming,
    #[display(fmt = "server-streaming")]
    ServerStreaming,
    #[display(fmt = "bidi-streaming")]
    BidiStreaming,
}

impl CallShape {
    pub fn from_flags(client_streams: bool, server_streams: bool) -> Self {
        match (client_streams, server_streams) {
            (false, false) => CallShape::Unary,
            (true, false) => CallShape::ClientStreaming,
            (false, true) => CallShape::ServerStreaming,
            (true, true) => CallShape::BidiStreaming,
        }
    }

    pub fn is_unary(self) -> bool {
        self == CallShape::Unary
    }

    pub fn is_streaming(self) -> bool {
        !self.is_unary()
    }

    pub fn client_streams(self) -> bool {
        matches!(self, CallShape::ClientStreaming | CallShape::BidiStreaming)
    }

    pub fn server_streams(self) -> bool {
        matches!(self, CallShape::ServerStreaming | CallShape::BidiStreaming)
    }
}

pub fn classify(method: &MethodSchema) -> CallShape {
    CallShape::from_flags(method.client_streaming, method.server_streaming)
}
