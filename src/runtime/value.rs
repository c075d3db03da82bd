//! The runtime value model.
//!
//! Values are a closed tagged variant. Operators and `.field` access are
//! implemented as a per-kind "capability vtable" (bound built-in methods)
//! rather than external trait-object dispatch — `Value::get_field` is the
//! single place every kind's field set is enumerated, matching the
//! specification's own design note that built-ins are ordinary callables
//! bound to a receiver, not a separate type-class mechanism.

use crate::diagnostics::KraitError;
use crate::frontend::ast::{Block, ParamList};
use crate::runtime::environment::Environment;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A user-defined closure: its parameters, body, and the environment it
/// was declared in.
#[derive(Debug)]
pub struct FunctionValue {
    pub name: Option<String>,
    pub params: ParamList,
    pub body: Block,
    pub env: Environment,
}

/// A host-implemented callable bound to a fixed arity and a human-readable
/// name used in `RUNTIME-1`/`RUNTIME-2` diagnostics (e.g. `"int#/"`,
/// `"slice"`).
pub struct BuiltinFunction {
    pub name: String,
    pub arity: usize,
    #[allow(clippy::type_complexity)]
    pub func: Box<dyn Fn(&[Value]) -> Result<Value, KraitError>>,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction").field("name", &self.name).finish()
    }
}

/// Progress of a struct instance's field factory: invoked at most once,
/// memoized, with `RUNTIME-9` raised for fields referenced through `self`
/// before the factory has finished producing them.
#[derive(Debug)]
enum FactoryState {
    NotStarted,
    InProgress,
    Done(Vec<(String, Value)>),
}

/// How a struct instance's field factory is run. A `struct Name(...): body`
/// declaration builds a `Block` that is evaluated in a child frame, with
/// the factory's fields being whatever names that frame binds (see
/// `Interpreter::run_struct_factory`). A direct `__struct__(name, ctor,
/// field_factory, extra_pairs)` call instead hands the factory over as a
/// plain callable `Value`, invoked with `self` and expected to *return* the
/// tuple of `(name, value)` pairs, rather than bind them as statements.
#[derive(Debug)]
pub enum StructFactory {
    Block(Rc<FunctionValue>),
    Value(Value),
}

/// A constructed struct instance. `ctor_id` is a stable per-declaration
/// identity used for equality (two instances are equal only if built by
/// the same `struct` declaration and field-wise equal).
#[derive(Debug)]
pub struct StructInstance {
    pub type_name: String,
    pub ctor_id: usize,
    pub ctor_fields: Vec<(String, Value)>,
    factory: RefCell<Option<StructFactory>>,
    factory_state: RefCell<FactoryState>,
}

/// A loaded module: the ordered bindings a `.krait` file exports.
#[derive(Debug)]
pub struct ModuleValue {
    pub fields: Vec<(String, Value)>,
}

/// A dynamically loaded native library handle.
pub struct LibraryValue {
    pub path: String,
    pub lib: libloading::Library,
    pub cache: RefCell<std::collections::HashMap<String, Value>>,
}

impl fmt::Debug for LibraryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryValue").field("path", &self.path).finish()
    }
}

/// The runtime value model: every value a Krait program can produce.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(Rc<str>),
    Tuple(Rc<[Value]>),
    Unit,
    Function(Rc<FunctionValue>),
    BuiltinFunction(Rc<BuiltinFunction>),
    Struct(Rc<StructInstance>),
    Module(Rc<ModuleValue>),
    Library(Rc<LibraryValue>),
}

impl Value {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Tuple(_) => "tuple",
            Value::Unit => "unit",
            Value::Function(_) => "function",
            Value::BuiltinFunction(_) => "built-in function",
            Value::Struct(_) => "struct instance",
            Value::Module(_) => "module",
            Value::Library(_) => "library",
        }
    }

    /// Constructs a freshly built struct instance. The factory itself is
    /// not run yet — `call_builtin` invokes it eagerly, immediately after
    /// the constructor that built this instance returns.
    #[must_use]
    pub fn new_struct(
        type_name: String,
        ctor_id: usize,
        ctor_fields: Vec<(String, Value)>,
        factory: StructFactory,
    ) -> Rc<StructInstance> {
        Rc::new(StructInstance {
            type_name,
            ctor_id,
            ctor_fields,
            factory: RefCell::new(Some(factory)),
            factory_state: RefCell::new(FactoryState::NotStarted),
        })
    }

    /// `to_str` per the textual output contract: the rendering of a value
    /// as `print`/`println` would write it.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => format_float(*v),
            Value::Bool(v) => v.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Unit => "(unit)".to_owned(),
            Value::Tuple(elements) => {
                let inner: Vec<String> = elements.iter().map(Value::to_display_string).collect();
                match elements.len() {
                    0 => "(,)".to_owned(),
                    1 => format!("({},)", inner[0]),
                    _ => format!("({})", inner.join(", ")),
                }
            }
            Value::Function(_) => "(function)".to_owned(),
            Value::BuiltinFunction(_) => "(built-in function)".to_owned(),
            Value::Struct(inst) => {
                let args: Vec<String> = inst
                    .ctor_fields
                    .iter()
                    .map(|(_, v)| v.to_display_string())
                    .collect();
                format!("{}({})", inst.type_name, args.join(", "))
            }
            Value::Module(_) => "(module)".to_owned(),
            Value::Library(_) => "(library)".to_owned(),
        }
    }

    /// Structural equality, used by every kind's `==`/`!=`.
    #[must_use]
    pub fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Unit, Value::Unit) => true,
            (Value::Tuple(x), Value::Tuple(y)) => {
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| Value::values_equal(a, b))
            }
            (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
            (Value::BuiltinFunction(x), Value::BuiltinFunction(y)) => Rc::ptr_eq(x, y),
            (Value::Struct(x), Value::Struct(y)) => {
                x.ctor_id == y.ctor_id
                    && x.ctor_fields.len() == y.ctor_fields.len()
                    && x.ctor_fields
                        .iter()
                        .zip(y.ctor_fields.iter())
                        .all(|((_, a), (_, b))| Value::values_equal(a, b))
            }
            (Value::Module(x), Value::Module(y)) => Rc::ptr_eq(x, y),
            (Value::Library(x), Value::Library(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }
}

/// Formats a float per the language's display rule: the shortest
/// round-trip representation, with a bare trailing `.0` dropped (`1.0`
/// prints as `1`).
#[must_use]
pub fn format_float(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}


impl StructInstance {
    /// Runs the field factory if it hasn't run yet, passing `self_value`
    /// (a `Value::Struct` wrapping this same instance) as the sole
    /// argument. Returns the memoized factory fields on every call after
    /// the first.
    ///
    /// # Errors
    /// Propagates whatever error the factory body raises while evaluating,
    /// via the `run_factory` callback supplied by the interpreter (the
    /// value model itself cannot evaluate AST).
    pub fn ensure_factory_run(
        &self,
        self_value: &Value,
        run_factory: impl FnOnce(&StructFactory, &Value) -> Result<Vec<(String, Value)>, KraitError>,
    ) -> Result<(), KraitError> {
        let needs_run = matches!(*self.factory_state.borrow(), FactoryState::NotStarted);
        if !needs_run {
            return Ok(());
        }
        let factory = self
            .factory
            .borrow_mut()
            .take()
            .expect("factory only taken once, guarded by factory_state");
        *self.factory_state.borrow_mut() = FactoryState::InProgress;
        let fields = run_factory(&factory, self_value)?;
        *self.factory_state.borrow_mut() = FactoryState::Done(fields);
        Ok(())
    }

    /// Looks up a factory-produced field, provided the factory has already
    /// run. Returns `Ok(None)` for "not a factory field"; the caller
    /// distinguishes "factory still running" via [`StructInstance::factory_in_progress`].
    #[must_use]
    pub fn factory_field(&self, name: &str) -> Option<Value> {
        match &*self.factory_state.borrow() {
            FactoryState::Done(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn factory_in_progress(&self) -> bool {
        matches!(*self.factory_state.borrow(), FactoryState::InProgress)
    }
}
