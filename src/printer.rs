use crate::{
    comment::Comment,
    error::{GenerateError, Result},
    go_type::{GoIdent, Imports},
    service::MethodRef,
};

pub const DEPRECATION_COMMENT: &str = "// Deprecated: Do not use.";

/// Printer builds a generated Go file into an internal buffer
pub struct Printer {
    /// The internal buffer holding the declarations
    buffer: String,

    /// Packages referenced by the printed declarations
    imports: Imports,

    /// The indent level, in tabs
    indent: usize,
}

/// Write one line into the printer buffer at the current indent level
macro_rules! emit {
    ($printer:ident, $v:expr) => {{
        $printer.write_line($v);
    }};
    ($printer:ident, $($arg:tt)*) => {{
        $printer.write_line(&format!($($arg)*));
    }};
}

/// Write one line and indent the following ones
macro_rules! emit_and_indent {
    ($printer:ident, $($arg:tt)*) => {{
        emit!($printer, $($arg)*);
        $printer.indent();
    }};
}

/// Outdent and write one line
macro_rules! outdent_and_emit {
    ($printer:ident, $($arg:tt)*) => {{
        $printer.outdent();
        emit!($printer, $($arg)*);
    }};
}

impl Printer {
    /// Create a new printer for a file generated into `import_path`
    pub fn new(import_path: Option<String>) -> Self {
        Self {
            buffer: String::new(),
            imports: Imports::new(import_path),
            indent: 0,
        }
    }

    pub fn write_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.buffer.push('\t');
        }
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn outdent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Print a blank line
    pub fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    /// Print the leading documentation of a schema element
    pub fn comment(&mut self, comment: Option<&Comment>) {
        if let Some(comment) = comment {
            for line in comment.go_lines() {
                self.write_line(&line);
            }
        }
    }

    /// Print the documentation block of a generated service type: `summary`,
    /// then the schema comments and deprecation marker, each set apart by `//`
    pub fn doc(&mut self, summary: &str, comment: Option<&Comment>, deprecated: bool) {
        self.write_line(&format!("// {}", summary));
        if comment.is_some() {
            self.write_line("//");
            self.comment(comment);
        }
        if deprecated {
            self.write_line("//");
            self.write_line(DEPRECATION_COMMENT);
        }
    }

    /// Print the deprecation marker when `deprecated` is set
    pub fn deprecated(&mut self, deprecated: bool) {
        if deprecated {
            self.write_line(DEPRECATION_COMMENT);
        }
    }

    /// Name of `go_name` declared in the package at `import_path`, e.g. `invoker.CallOption`
    pub fn ident(&mut self, import_path: &str, go_name: &str) -> String {
        format!("{}.{}", self.imports.package(import_path), go_name)
    }

    /// Declare `name` at package level so no import is bound to it
    pub fn reserve(&mut self, name: &str) {
        self.imports.reserve(name);
    }

    /// Name of a message type as printed in this file
    pub fn qualify(&mut self, ident: &GoIdent) -> String {
        self.imports.qualify(ident)
    }

    /// Name of a method's request type, failing when the reference cannot be named
    pub fn input(&mut self, method: MethodRef) -> Result<String> {
        self.message(method, &method.input)
    }

    /// Name of a method's response type, failing when the reference cannot be named
    pub fn output(&mut self, method: MethodRef) -> Result<String> {
        self.message(method, &method.output)
    }

    fn message(&mut self, method: MethodRef, ident: &GoIdent) -> Result<String> {
        if !ident.is_nameable() {
            return Err(GenerateError::UnresolvedType {
                method: format!("{}.{}", method.service.name, method.name),
                reference: match &ident.import_path {
                    Some(path) => format!("{}.{}", path, ident.go_name),
                    None => ident.go_name.clone(),
                },
            });
        }
        Ok(self.qualify(ident))
    }

    pub fn into_parts(self) -> (String, Imports) {
        (self.buffer, self.imports)
    }
}
