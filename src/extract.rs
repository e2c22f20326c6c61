//! Evaluation of Jsonnet sources down to their docsonnet data
//!
//! [`extract`] runs the bundled bootstrap program against a fresh interpreter. The file under
//! inspection is handed over as external code bound to [`EXT_VAR`], and every import the
//! interpreter performs goes through a [`BundledImporter`] so `doc-util` resolves without
//! being installed anywhere.
//!
//! Nothing survives a call: interpreter, importer and their caches are dropped on return.

use crate::bundle::{BOOTSTRAP, BOOTSTRAP_NAME, EXT_VAR};
use crate::error::Error;
use crate::import::{
    BundledImporter, FileImporter, FoundAt, ImportError, Importer, INTERNAL_LOCATION,
};
use jrsonnet_evaluator::error::ErrorKind;
use jrsonnet_evaluator::manifest::JsonFormat;
use jrsonnet_evaluator::trace::{CompactFormat, PathResolver, TraceFormat};
use jrsonnet_evaluator::{ImportResolver, State};
use jrsonnet_gcmodule::Trace;
use jrsonnet_parser::{SourceDirectory, SourceFile, SourcePath, SourceVirtual};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Extraction options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    /// Library search paths, searched last to first after the importing file's directory.
    pub jpath: Vec<PathBuf>,
}

impl Opts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a search path
    pub fn jpath(mut self, dir: impl Into<PathBuf>) -> Self {
        self.jpath.push(dir.into());
        self
    }

    pub fn jpaths<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.jpath.extend(dirs.into_iter().map(Into::into));
        self
    }
}

/// Evaluates `filename` and returns the docsonnet data in it as JSON, exactly as the
/// bootstrap program emits it.
///
/// This representation is only meant as input to [`transform`](crate::transform::transform).
pub fn extract(filename: impl AsRef<Path>, opts: &Opts) -> Result<Vec<u8>, Error> {
    let filename = filename.as_ref();
    let importer = FileImporter::new(opts.jpath.iter().cloned()).map_err(Error::Resolver)?;
    let main = import_expr(filename).map_err(Error::Resolver)?;

    tracing::debug!(file = %filename.display(), jpath = ?opts.jpath, "extracting docsonnet data");

    let state = State::default();
    state.set_import_resolver(JsonnetImporter::new(BundledImporter::new(importer)));

    let stdlib =
        jrsonnet_stdlib::ContextInitializer::new(state.clone(), PathResolver::new_cwd_fallback());
    stdlib.add_ext_code(EXT_VAR, main).map_err(evaluation)?;
    state.set_context_initializer(stdlib);

    let value = state
        .evaluate_snippet(BOOTSTRAP_NAME, BOOTSTRAP)
        .map_err(evaluation)?;
    let json = value.manifest(JsonFormat::default()).map_err(evaluation)?;

    tracing::debug!(file = %filename.display(), bytes = json.len(), "extracted docsonnet data");
    Ok(json.to_string().into_bytes())
}

/// `(import "<filename>")`, with the path quoted as a JSON string, which Jsonnet accepts too.
fn import_expr(filename: &Path) -> Result<String, ImportError> {
    let path = filename.to_str().ok_or_else(|| ImportError::NonUtf8Path {
        path: filename.to_path_buf(),
    })?;
    let quoted = serde_json::Value::String(path.to_string());
    Ok(format!("(import {})", quoted))
}

/// Renders the interpreter's diagnostic with its stack trace and source positions.
fn evaluation(err: jrsonnet_evaluator::Error) -> Error {
    let format = CompactFormat {
        resolver: PathResolver::new_cwd_fallback(),
        ..Default::default()
    };
    let message = format.format(&err).unwrap_or_else(|_| err.to_string());
    Error::Evaluation(message)
}

fn runtime_error(message: String) -> jrsonnet_evaluator::Error {
    ErrorKind::RuntimeError(message.into()).into()
}

/// Plugs an [`Importer`] into the interpreter.
///
/// The interpreter resolves and loads in two steps; contents found while resolving are held
/// until it asks for them.
struct JsonnetImporter {
    importer: BundledImporter<FileImporter>,
    loaded: RefCell<HashMap<SourcePath, Vec<u8>>>,
}

impl JsonnetImporter {
    fn new(importer: BundledImporter<FileImporter>) -> Self {
        Self {
            importer,
            loaded: RefCell::new(HashMap::new()),
        }
    }
}

impl Trace for JsonnetImporter {
    fn is_type_tracked() -> bool {
        false
    }
}

impl ImportResolver for JsonnetImporter {
    fn resolve_from(&self, from: &SourcePath, path: &str) -> jrsonnet_evaluator::Result<SourcePath> {
        let dir = if let Some(file) = from.downcast_ref::<SourceFile>() {
            file.path().parent().map(Path::to_path_buf).unwrap_or_default()
        } else if let Some(dir) = from.downcast_ref::<SourceDirectory>() {
            dir.path().to_path_buf()
        } else {
            // snippets and external code resolve against the working directory
            PathBuf::new()
        };

        let resolved = self
            .importer
            .import(&dir, path)
            .map_err(|e| runtime_error(e.to_string()))?;
        let source = match &resolved.found_at {
            FoundAt::Internal => SourcePath::new(SourceVirtual(INTERNAL_LOCATION.into())),
            FoundAt::File(found) => SourcePath::new(SourceFile::new(found.clone())),
        };
        self.loaded
            .borrow_mut()
            .insert(source.clone(), resolved.contents.into_bytes());
        Ok(source)
    }

    fn resolve(&self, path: &Path) -> jrsonnet_evaluator::Result<SourcePath> {
        self.resolve_from(&SourcePath::default(), &path.to_string_lossy())
    }

    fn load_file_contents(&self, resolved: &SourcePath) -> jrsonnet_evaluator::Result<Vec<u8>> {
        if let Some(contents) = self.loaded.borrow().get(resolved) {
            return Ok(contents.clone());
        }
        match resolved.downcast_ref::<SourceFile>() {
            Some(file) => fs::read(file.path()).map_err(|e| {
                runtime_error(format!("couldn't read {}: {}", file.path().display(), e))
            }),
            None => Err(runtime_error(format!("can't load {:?}", resolved))),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
