use crate::{error::Result, service::ServiceSchema};
use serde::Deserialize;

/// A proto file as seen by the generators.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileSchema {
    /// Path of the proto file relative to the proto root, e.g. `echo/echo.proto`
    pub path: String,

    /// The proto package, e.g. `echo.v1`
    #[serde(default)]
    pub package: String,

    /// Name of the Go package the file is generated into
    pub go_package_name: String,

    /// Import path of the Go package the file is generated into
    #[serde(default)]
    pub go_import_path: Option<String>,

    /// Generated file names are built by appending a suffix to this prefix, e.g. `echo/echo`
    pub generated_filename_prefix: String,

    #[serde(default)]
    pub services: Vec<ServiceSchema>,
}

impl FileSchema {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The last segment of the generated file name prefix, e.g. `echo` for `api/echo`.
    pub fn base_name(&self) -> &str {
        self.generated_filename_prefix
            .rsplit('/')
            .next()
            .unwrap_or(&self.generated_filename_prefix)
    }

    /// Fully qualified proto name of a service, e.g. `echo.v1.Echo`
    pub fn service_full_name(&self, service: &ServiceSchema) -> String {
        match self.package.is_empty() {
            true => service.name.to_string(),
            false => format!("{}.{}", self.package, service.name),
        }
    }
}
