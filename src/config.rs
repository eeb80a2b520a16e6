use crate::error::Result;
use serde::Deserialize;

/// Import paths of the runtime packages referenced by interface-based stubs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct V1Packages {
    /// Transport: `IClient`, `Invoke`, `NewStream`, `ServiceDesc`, ...
    pub invoker: String,

    /// Declares `ServiceInfo`, the routing descriptor used by the service locator
    pub kite: String,

    /// Service locator exposing `GetClient(ServiceInfo)`
    pub client: String,
}

impl Default for V1Packages {
    fn default() -> Self {
        Self {
            invoker: "git.dhgames.cn/svr_comm/kite/pkg/invoker".into(),
            kite: "git.dhgames.cn/svr_comm/kite".into(),
            client: "git.dhgames.cn/svr_comm/kite/cmd/client".into(),
        }
    }
}

/// Import paths of the runtime packages referenced by dispatch-table stubs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct V2Packages {
    /// Declares the global dispatch registry `Dispatch`
    pub service: String,

    /// Message codec with `Marshal` / `Unmarshal`
    pub proto: String,

    /// Transport: `Invoke`, `Destination`, `Option`
    pub kite: String,

    pub errors: String,
}

impl Default for V2Packages {
    fn default() -> Self {
        Self {
            service: "git.dhgames.cn/svr_comm/kite/v2/server/service".into(),
            proto: "google.golang.org/protobuf/proto".into(),
            kite: "git.dhgames.cn/svr_comm/kite/v2/kite".into(),
            errors: "errors".into(),
        }
    }
}

/// Config let us configure how a schema is turned into a generated file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Appended to the file's generated name prefix
    pub file_suffix: String,

    /// First line of every generated file, printed as a line comment
    pub header: String,

    /// Emit the reference-import and version-assertion lines before the first
    /// interface-based service
    pub emit_reference_imports: bool,

    pub v1: V1Packages,
    pub v2: V2Packages,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_suffix: "_kite.pb.go".into(),
            header: "Code generated by protoc-gen-go-kite. DO NOT EDIT.".into(),
            emit_reference_imports: true,
            v1: V1Packages::default(),
            v2: V2Packages::default(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            Config::from_json(r#"{ "file_suffix": ".kite.go", "v2": { "kite": "example.com/kite" } }"#)
                .unwrap();

        assert_eq!(config.file_suffix, ".kite.go");
        assert_eq!(config.v2.kite, "example.com/kite");
        assert_eq!(config.v2.proto, V2Packages::default().proto);
        assert_eq!(config.v1, V1Packages::default());
        assert!(config.emit_reference_imports);
    }

    #[test]
    fn test_invalid_json() {
        assert!(Config::from_json("{ \"file_suffix\": 1 }").is_err());
    }
}
