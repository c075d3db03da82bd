//! Dynamic-library (FFI) loading via `libloading`.
//!
//! Mirrors [`crate::backend::module_loader::ModuleLoader`]'s shape: a
//! search path, a cache, and a resolution convention (here, `libloading`
//! in place of the module loader's own file probing). Resolved
//! `libloading::Library` handles are leaked for the process lifetime
//! (never dropped) since wrapped native symbols must stay valid for as
//! long as any `built-in function` value referencing them exists — the
//! resource model in the specification calls this out explicitly.
//!
//! A bare C symbol table carries no portable way to tell "this address
//! is a value" from "this address is a function", let alone a function's
//! arity — `dlsym`/`libloading` just hand back an address typed however
//! the caller asked for it. So a library exports, alongside each usable
//! symbol `X`, a plain `int64_t` descriptor `X__krait_kind` saying how to
//! treat it: `-1` for a value, `0`/`1` for a `int64_t` function of that
//! many `int64_t` arguments. A symbol that resolves but carries no
//! descriptor (or an unrecognized one) exists without being a value the
//! loader knows how to use — `RUNTIME-16`.

use libloading::{Library, Symbol};
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::diagnostics::KraitError;
use crate::runtime::value::{BuiltinFunction, LibraryValue, Value};

type NativeFn0 = unsafe extern "C" fn() -> i64;
type NativeFn1 = unsafe extern "C" fn(i64) -> i64;

/// Resolves `import_library(name)` and caches the resulting library
/// handle by name.
#[derive(Debug)]
pub struct LibraryLoader {
    search_paths: Vec<PathBuf>,
    cache: HashMap<String, Rc<LibraryValue>>,
}

impl LibraryLoader {
    #[must_use]
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            cache: HashMap::new(),
        }
    }

    /// Loads (or returns the cached handle for) the native library
    /// `name`, probing `<dir>/<name>_/<name>.<platform-ext>` across the
    /// search path.
    ///
    /// # Errors
    /// `RUNTIME-15` if no matching shared object is found.
    pub fn load(&mut self, name: &str) -> Result<Rc<LibraryValue>, KraitError> {
        if let Some(cached) = self.cache.get(name) {
            debug!("library cache hit for `{name}`");
            return Ok(Rc::clone(cached));
        }

        let filename = format!("{name}{}", std::env::consts::DLL_SUFFIX);
        let path = self
            .search_paths
            .iter()
            .map(|root| root.join(format!("{name}_")).join(&filename))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| KraitError::LibraryNotFound { name: name.to_owned() })?;

        // Safety: loading an arbitrary shared object is inherently unsafe;
        // the caller opted into this via `import_library`, matching the
        // specification's FFI contract. The handle is leaked (never
        // dropped) because a wrapped symbol's `Value::BuiltinFunction`
        // may outlive this loader.
        let lib = unsafe { Library::new(&path) }.map_err(|_| KraitError::LibraryNotFound { name: name.to_owned() })?;
        debug!("loaded library `{name}` from {}", path.display());

        let value = Rc::new(LibraryValue {
            path: path.display().to_string(),
            lib,
            cache: std::cell::RefCell::new(HashMap::new()),
        });
        self.cache.insert(name.to_owned(), Rc::clone(&value));
        Ok(value)
    }
}

/// Resolves and wraps `symbol` on an already-loaded library, caching the
/// wrapper so repeated `get(symbol)` calls return the same value (tested
/// via `RandomInteger() == RandomInteger()` identity).
///
/// # Errors
/// `RUNTIME-17` if `symbol` doesn't exist in the library at all.
/// `RUNTIME-16` if it exists but its `__krait_kind` descriptor is
/// missing or names an unsupported kind.
pub fn resolve_symbol(lib: &Rc<LibraryValue>, symbol: &str) -> Result<Value, KraitError> {
    if let Some(cached) = lib.cache.borrow().get(symbol) {
        return Ok(cached.clone());
    }

    let unusable = || KraitError::LibrarySymbolUnusable {
        library: lib.path.clone(),
        symbol: symbol.to_owned(),
    };

    // Safety: only probed for existence; the address is never read
    // through this type.
    unsafe { lib.lib.get::<*const ()>(symbol.as_bytes()) }.map_err(|_| KraitError::LibrarySymbolNotFound {
        library: lib.path.clone(),
        symbol: symbol.to_owned(),
    })?;

    let wrapped = match read_symbol_kind(lib, symbol) {
        Some(-1) => {
            // Safety: the descriptor promises `symbol` is a plain `int64_t`.
            let value: Symbol<*const i64> = unsafe { lib.lib.get(symbol.as_bytes()) }.map_err(|_| unusable())?;
            Value::Int(unsafe { **value })
        }
        Some(0) => {
            // Safety: the descriptor promises `symbol` is `int64_t symbol(void)`.
            let func: Symbol<NativeFn0> = unsafe { lib.lib.get(symbol.as_bytes()) }.map_err(|_| unusable())?;
            let raw: NativeFn0 = *func;
            Value::BuiltinFunction(Rc::new(BuiltinFunction {
                name: format!("{symbol}#native"),
                arity: 0,
                func: Box::new(move |_| Ok(Value::Int(unsafe { raw() }))),
            }))
        }
        Some(1) => {
            // Safety: the descriptor promises `symbol` is `int64_t symbol(int64_t)`.
            let func: Symbol<NativeFn1> = unsafe { lib.lib.get(symbol.as_bytes()) }.map_err(|_| unusable())?;
            let raw: NativeFn1 = *func;
            let name = symbol.to_owned();
            Value::BuiltinFunction(Rc::new(BuiltinFunction {
                name: format!("{symbol}#native"),
                arity: 1,
                func: Box::new(move |args| {
                    let Value::Int(arg) = &args[0] else {
                        return Err(KraitError::WrongArgumentType {
                            op: name.clone(),
                            position: 1,
                        });
                    };
                    Ok(Value::Int(unsafe { raw(*arg) }))
                }),
            }))
        }
        _ => return Err(unusable()),
    };

    lib.cache.borrow_mut().insert(symbol.to_owned(), wrapped.clone());
    Ok(wrapped)
}

/// Reads `{symbol}__krait_kind`, the descriptor every usable native
/// symbol exports alongside itself. Missing or unreadable descriptors
/// resolve to `None`, same as any other unsupported kind.
fn read_symbol_kind(lib: &Rc<LibraryValue>, symbol: &str) -> Option<i64> {
    let descriptor_name = format!("{symbol}__krait_kind");
    // Safety: a present descriptor is documented as a plain `int64_t`.
    let descriptor: Symbol<*const i64> = unsafe { lib.lib.get(descriptor_name.as_bytes()) }.ok()?;
    Some(unsafe { **descriptor })
}
