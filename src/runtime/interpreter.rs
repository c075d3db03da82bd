//! The tree-walking evaluator.
//!
//! `Interpreter` owns the process-wide module/library caches and drives
//! `eval`/`eval_block` over the AST the parser produces. Binary and unary
//! operators are lowered uniformly onto `select_field` (`a + b` becomes
//! `a.+(b)`, i.e. `call_value(select_field(a, "+"), [b])`) except `&&`/`||`,
//! which short-circuit structurally rather than dispatch through a method
//! call, matching the specification's own design note.

use crate::backend::library_loader::LibraryLoader;
use crate::backend::module_loader::ModuleLoader;
use crate::diagnostics::KraitError;
use crate::frontend::ast::{BinOp, Block, Expr, ExprKind, UnOp};
use crate::runtime::builtins;
use crate::runtime::environment::{force, Environment};
use crate::runtime::value::{BuiltinFunction, FunctionValue, ModuleValue, StructFactory, Value};
use crate::io::PrintSink;
use std::cell::Cell;
use std::rc::Rc;

/// Drives evaluation of a parsed program. Holds the mutable, process-wide
/// collaborators (module loader, library loader) and the output sink,
/// since `println`/`print` need somewhere to write that tests can swap
/// out for a buffer.
pub struct Interpreter<'a> {
    pub modules: ModuleLoader,
    pub libraries: LibraryLoader,
    pub sink: &'a mut dyn PrintSink,
    next_ctor_id: Cell<usize>,
    /// Top-level bindings from `KRAIT_STARTUP`, merged into the root
    /// environment and every freshly loaded module's environment, unless
    /// that module's path lies under `startup_exclude`.
    startup_bindings: Vec<(String, Value)>,
    startup_exclude: Option<std::path::PathBuf>,
}

impl<'a> Interpreter<'a> {
    #[must_use]
    pub fn new(modules: ModuleLoader, libraries: LibraryLoader, sink: &'a mut dyn PrintSink) -> Self {
        Self {
            modules,
            libraries,
            sink,
            next_ctor_id: Cell::new(0),
            startup_bindings: Vec::new(),
            startup_exclude: None,
        }
    }

    /// Records the bindings produced by evaluating `KRAIT_STARTUP`
    /// (already run by the caller, typically [`crate::run`]) and the
    /// exclusion root below which modules must not be re-seeded with them.
    pub fn set_startup(&mut self, bindings: Vec<(String, Value)>, exclude: Option<std::path::PathBuf>) {
        self.startup_bindings = bindings;
        self.startup_exclude = exclude;
    }

    /// Builds a fresh environment seeded with the global built-ins and, if
    /// `path` is not under the startup-exclusion root, the startup
    /// bindings.
    fn fresh_module_env(&self, path: &std::path::Path) -> Environment {
        let env = Environment::root();
        bind_global_builtins(&env);
        let excluded = self
            .startup_exclude
            .as_ref()
            .is_some_and(|root| path.starts_with(root));
        if !excluded {
            for (name, value) in &self.startup_bindings {
                env.bind_value(name.clone(), value.clone());
            }
        }
        env
    }

    fn fresh_ctor_id(&self) -> usize {
        let id = self.next_ctor_id.get();
        self.next_ctor_id.set(id + 1);
        id
    }

    /// Forces a thunk or evaluates a plain expression in `env`. Exposed so
    /// callers outside this module (the library loader's startup-binding
    /// collection, `lib::run`) can force the cells a fresh environment's
    /// [`Environment::own_names`] produces without reaching into private
    /// evaluator internals.
    ///
    /// # Errors
    /// Any `KraitError` evaluating `expr` raises.
    pub fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> Result<Value, KraitError> {
        self.eval(expr, env)
    }

    /// Evaluates a whole program's top-level statements in `env`, returning
    /// the value of the last one (`unit` for an empty program).
    ///
    /// # Errors
    /// Any `KraitError` raised while evaluating a statement.
    pub fn eval_program(&mut self, stmts: &[Expr], env: &Environment) -> Result<Value, KraitError> {
        let mut last = Value::Unit;
        for stmt in stmts {
            last = self.eval_stmt(stmt, env)?;
        }
        self.force_trailing_bind(stmts.last(), env, last)
    }

    /// Evaluates a block (the body of a function, struct factory, or
    /// branch), returning the value of its last statement.
    fn eval_block(&mut self, block: &Block, env: &Environment) -> Result<Value, KraitError> {
        let mut last = Value::Unit;
        for stmt in block.iter() {
            last = self.eval_stmt(stmt, env)?;
        }
        self.force_trailing_bind(block.last(), env, last)
    }

    /// `eval_stmt`'s `Bind` arm only ever binds a thunk, never forces it —
    /// forcing has to wait for an actual reference to the name, or every
    /// binding statement would have to run in program order, defeating
    /// forward references (`result = foo(0)` written before `fn foo` is
    /// declared). But a block's *value* is its last statement's value, so
    /// if that last statement happens to be a binding, something has to
    /// force it: here, once every statement (including whatever declares
    /// the names it might reference) has already run.
    fn force_trailing_bind(&mut self, last_stmt: Option<&Expr>, env: &Environment, last: Value) -> Result<Value, KraitError> {
        if let Some(Expr { kind: ExprKind::Bind { name, .. }, .. }) = last_stmt {
            let cell = env.lookup(&name.name).expect("just bound");
            return force(&cell, |expr, env| self.eval(expr, env));
        }
        Ok(last)
    }

    /// Evaluates one top-level-or-block statement. `Bind` creates a lazy
    /// thunk and is not itself forced (see `force_trailing_bind`);
    /// `FnDecl`/`StructDecl` bind eagerly, since constructing a closure or
    /// a constructor is pure and cannot fail or cycle. Anything else is a
    /// plain expression, evaluated for its value.
    fn eval_stmt(&mut self, stmt: &Expr, env: &Environment) -> Result<Value, KraitError> {
        match &stmt.kind {
            ExprKind::Bind { name, value } => {
                env.bind_lazy(name.name.clone(), Rc::new((**value).clone()), env.clone());
                Ok(Value::Unit)
            }
            ExprKind::FnDecl { name, params, body } => {
                let function = Value::Function(Rc::new(FunctionValue {
                    name: Some(name.name.clone()),
                    params: params.clone(),
                    body: Rc::clone(body),
                    env: env.clone(),
                }));
                env.bind_value(name.name.clone(), function.clone());
                Ok(function)
            }
            ExprKind::StructDecl { name, params, body } => {
                let ctor = self.build_struct_ctor(name.name.clone(), params.clone(), Rc::clone(body), env.clone());
                env.bind_value(name.name.clone(), ctor.clone());
                Ok(ctor)
            }
            _ => self.eval(stmt, env),
        }
    }

    /// Evaluates a plain expression. `Bind`/`FnDecl`/`StructDecl` never
    /// reach here: the grammar only produces them in statement position,
    /// and `eval_stmt`/`eval_block` handle statements directly.
    fn eval(&mut self, expr: &Expr, env: &Environment) -> Result<Value, KraitError> {
        match &expr.kind {
            ExprKind::Int(v) => Ok(Value::Int(*v)),
            ExprKind::Float(v) => Ok(Value::Float(*v)),
            ExprKind::Bool(v) => Ok(Value::Bool(*v)),
            ExprKind::Str(s) => Ok(Value::Str(s.as_str().into())),
            ExprKind::Unit => Ok(Value::Unit),

            ExprKind::Ident(name) => {
                let cell = env.lookup(name).unwrap_or_else(|| {
                    panic!("identifier `{name}` passed PARSER-6 but is unbound at eval time")
                });
                force(&cell, |expr, env| self.eval(expr, env))
            }

            ExprKind::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs, env),
            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand, env),

            ExprKind::Call { callee, args } => {
                let callee_value = self.eval(callee, env)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for a in args {
                    arg_values.push(self.eval(a, env)?);
                }
                self.call_value(&callee_value, &arg_values)
            }

            ExprKind::Select { receiver, name } => {
                let receiver_value = self.eval(receiver, env)?;
                self.select_field(&receiver_value, &name.name)
            }

            ExprKind::Tuple { elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for e in elements {
                    values.push(self.eval(e, env)?);
                }
                Ok(Value::Tuple(values.into()))
            }

            ExprKind::AnonFn { params, body } => Ok(Value::Function(Rc::new(FunctionValue {
                name: None,
                params: params.clone(),
                body: Rc::clone(body),
                env: env.clone(),
            }))),

            ExprKind::If { branches, else_branch } => {
                for (cond, body) in branches {
                    let cond_value = self.eval(cond, env)?;
                    match cond_value {
                        Value::Bool(true) => return self.eval_block(body, &env.child()),
                        Value::Bool(false) => continue,
                        _ => {
                            return Err(KraitError::WrongArgumentType {
                                op: "__if_else__".to_owned(),
                                position: 1,
                            })
                        }
                    }
                }
                match else_branch {
                    Some(body) => self.eval_block(body, &env.child()),
                    None => Ok(Value::Unit),
                }
            }

            ExprKind::Block(body) => self.eval_block(body, &env.child()),

            ExprKind::Bind { .. } | ExprKind::FnDecl { .. } | ExprKind::StructDecl { .. } => {
                unreachable!("the grammar only produces these in statement position")
            }
        }
    }

    fn eval_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, env: &Environment) -> Result<Value, KraitError> {
        // `&&`/`||` short-circuit structurally; they are not method calls.
        if matches!(op, BinOp::And | BinOp::Or) {
            let lhs_value = self.eval(lhs, env)?;
            let Value::Bool(lhs_bool) = lhs_value else {
                return Err(KraitError::WrongArgumentType {
                    op: op.method_name().to_owned(),
                    position: 1,
                });
            };
            if op == BinOp::And && !lhs_bool {
                return Ok(Value::Bool(false));
            }
            if op == BinOp::Or && lhs_bool {
                return Ok(Value::Bool(true));
            }
            let rhs_value = self.eval(rhs, env)?;
            return match rhs_value {
                Value::Bool(b) => Ok(Value::Bool(b)),
                _ => Err(KraitError::WrongArgumentType {
                    op: op.method_name().to_owned(),
                    position: 1,
                }),
            };
        }

        let lhs_value = self.eval(lhs, env)?;
        let rhs_value = self.eval(rhs, env)?;
        let method = self.select_field(&lhs_value, op.method_name())?;
        self.call_value(&method, &[rhs_value])
    }

    fn eval_unary(&mut self, op: UnOp, operand: &Expr, env: &Environment) -> Result<Value, KraitError> {
        let value = self.eval(operand, env)?;
        let method = self.select_field(&value, op.method_name())?;
        self.call_value(&method, &[])
    }

    /// Resolves `.name` on an already-evaluated `receiver`: the per-kind
    /// built-in tables in `builtins::select_field` for primitives, and
    /// direct handling for struct instances and modules, which need
    /// interpreter access (factory execution) that the value model alone
    /// cannot provide.
    ///
    /// # Errors
    /// `RUNTIME-9` if the receiver has no field of that name.
    pub fn select_field(&mut self, receiver: &Value, name: &str) -> Result<Value, KraitError> {
        match receiver {
            Value::Struct(inst) => {
                if matches!(name, "to_str" | "==" | "!=") {
                    return builtins::select_field(receiver, name).ok_or_else(|| KraitError::UnknownField {
                        field: name.to_owned(),
                    });
                }
                // A field access while the factory is still running (a
                // reentrant access through `self`) sees neither the
                // constructor arguments nor any factory field yet — the
                // combined set only exists once the factory returns —
                // so it's RUNTIME-9 regardless of which field is named.
                if inst.factory_in_progress() {
                    return Err(KraitError::UnknownField { field: name.to_owned() });
                }
                if let Some(value) = inst.ctor_fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone()) {
                    return Ok(value);
                }
                inst.factory_field(name)
                    .ok_or_else(|| KraitError::UnknownField { field: name.to_owned() })
            }
            Value::Module(module) => module
                .fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| KraitError::UnknownField { field: name.to_owned() }),
            Value::Library(lib) => {
                if name == "get" {
                    return Ok(self.library_get_method(Rc::clone(lib)));
                }
                Err(KraitError::UnknownField { field: name.to_owned() })
            }
            _ => builtins::select_field(receiver, name).ok_or_else(|| KraitError::UnknownField {
                field: name.to_owned(),
            }),
        }
    }

    fn library_get_method(&self, lib: Rc<crate::runtime::value::LibraryValue>) -> Value {
        Value::BuiltinFunction(Rc::new(BuiltinFunction {
            name: "library#get".to_owned(),
            arity: 1,
            func: Box::new(move |args| {
                let Value::Str(symbol) = &args[0] else {
                    return Err(KraitError::WrongArgumentType {
                        op: "get".to_owned(),
                        position: 1,
                    });
                };
                crate::backend::library_loader::resolve_symbol(&lib, symbol)
            }),
        }))
    }

    /// Invokes a callable value with already-evaluated arguments.
    ///
    /// # Errors
    /// `RUNTIME-1` on arity mismatch; whatever the callee's body raises
    /// otherwise. A struct instance is also callable, as shorthand for
    /// field access by name: `Box("foo")("value")` reads the same field
    /// as `Box("foo").value`. Any other receiver is not callable at all.
    pub fn call_value(&mut self, callee: &Value, args: &[Value]) -> Result<Value, KraitError> {
        match callee {
            Value::Function(f) => self.call_user_function(f, args),
            Value::BuiltinFunction(b) => self.call_builtin(b, args),
            Value::Struct(_) => {
                if args.len() != 1 {
                    return Err(KraitError::arity_mismatch(1, args.len()));
                }
                let Value::Str(name) = &args[0] else {
                    return Err(KraitError::WrongArgumentType {
                        op: "call".to_owned(),
                        position: 1,
                    });
                };
                self.select_field(callee, name)
            }
            _ => Err(KraitError::WrongArgumentType {
                op: "call".to_owned(),
                position: 0,
            }),
        }
    }

    fn call_user_function(&mut self, f: &Rc<FunctionValue>, args: &[Value]) -> Result<Value, KraitError> {
        if args.len() != f.params.len() {
            return Err(KraitError::arity_mismatch(f.params.len(), args.len()));
        }
        let frame = f.env.child();
        for (param, value) in f.params.iter().zip(args.iter()) {
            frame.bind_value(param.name.clone(), value.clone());
        }
        self.eval_block(&f.body, &frame)
    }

    fn call_builtin(&mut self, b: &Rc<BuiltinFunction>, args: &[Value]) -> Result<Value, KraitError> {
        // Globals needing interpreter access are special-cased by name;
        // everything else is a pure per-value-kind method and goes
        // straight through the generic closure.
        match b.name.as_str() {
            "println" => {
                self.write_joined(args)?;
                self.sink.print_char('\n');
                return Ok(Value::Unit);
            }
            "print" => {
                self.write_joined(args)?;
                return Ok(Value::Unit);
            }
            "import" => return self.builtin_import(args),
            "import_library" => return self.builtin_import_library(args),
            "__if_else__" => return self.builtin_if_else(args),
            "__tuple__" => return Ok(Value::Tuple(args.to_vec().into())),
            "__module__" => return self.builtin_module(args),
            "__struct__" => {
                let value = self.builtin_struct(args)?;
                return self.finish_struct(value);
            }
            _ => {}
        }
        if args.len() != b.arity {
            return Err(KraitError::arity_mismatch(b.arity, args.len()));
        }
        let value = (b.func)(args)?;
        self.finish_struct(value)
    }

    /// A struct constructor is the only built-in that ever produces a
    /// `Value::Struct`; its field factory runs here, eagerly, right after
    /// construction — not lazily on first field access — so that a
    /// factory's side effects (and any RUNTIME-9 it raises reaching
    /// through `self` before the instance is whole) are observed as soon
    /// as the struct literal is evaluated.
    fn finish_struct(&mut self, value: Value) -> Result<Value, KraitError> {
        if let Value::Struct(inst) = &value {
            self.run_struct_factory(inst, &value)?;
        }
        Ok(value)
    }

    /// Implements `__struct__(name, ctor, field_factory, extra_pairs)`:
    /// the named global built-in `struct` declarations desugar to, and
    /// which is itself a directly callable value per the specification.
    /// `ctor`'s identity (not its contents) is the instance's equality
    /// key, mirroring the per-declaration counter `build_struct_ctor`
    /// uses for the sugared form.
    fn builtin_struct(&mut self, args: &[Value]) -> Result<Value, KraitError> {
        if args.len() != 4 {
            return Err(KraitError::arity_mismatch(4, args.len()));
        }
        let Value::Str(name) = &args[0] else {
            return Err(KraitError::WrongArgumentType {
                op: "__struct__".to_owned(),
                position: 1,
            });
        };
        let ctor_id = callable_identity(&args[1]).ok_or_else(|| KraitError::WrongArgumentType {
            op: "__struct__".to_owned(),
            position: 2,
        })?;
        let Value::Tuple(extra_pairs) = &args[3] else {
            return Err(KraitError::WrongArgumentType {
                op: "__struct__".to_owned(),
                position: 4,
            });
        };
        let ctor_fields = extract_name_value_pairs(extra_pairs)?;
        Ok(Value::Struct(Value::new_struct(
            name.to_string(),
            ctor_id,
            ctor_fields,
            StructFactory::Value(args[2].clone()),
        )))
    }

    /// Runs a struct instance's field factory to completion. A `Block`
    /// factory (from a `struct` declaration) binds `self` in a child
    /// frame and collects whatever names its body declares — an `fn`, a
    /// plain binding — the same way a module collects the names its
    /// top-level statements bind. A `Value` factory (from a direct
    /// `__struct__` call) is instead called with `self` as its sole
    /// argument, and must itself return the tuple of `(name, value)`
    /// pairs.
    fn run_struct_factory(&mut self, inst: &Rc<crate::runtime::value::StructInstance>, self_value: &Value) -> Result<(), KraitError> {
        inst.ensure_factory_run(self_value, |factory, self_value| match factory {
            StructFactory::Block(factory) => {
                let frame = factory.env.child();
                frame.bind_value("self", self_value.clone());
                self.eval_block(&factory.body, &frame)?;
                let mut fields = Vec::new();
                for name in frame.own_names() {
                    if name == "self" {
                        continue;
                    }
                    let cell = frame.lookup(&name).expect("own_names name is bound in this frame");
                    let value = force(&cell, |expr, env| self.eval_expr(expr, env))?;
                    fields.push((name, value));
                }
                Ok(fields)
            }
            StructFactory::Value(callable) => {
                let result = self.call_value(callable, &[self_value.clone()])?;
                let Value::Tuple(pairs) = &result else {
                    return Err(KraitError::WrongArgumentType {
                        op: "field_factory".to_owned(),
                        position: 1,
                    });
                };
                extract_name_value_pairs(pairs)
            }
        })
    }

    fn write_joined(&mut self, args: &[Value]) -> Result<(), KraitError> {
        for (i, a) in args.iter().enumerate() {
            if i > 0 {
                self.sink.print_char(' ');
            }
            self.sink.print_str(&a.to_display_string());
        }
        Ok(())
    }

    fn builtin_if_else(&mut self, args: &[Value]) -> Result<Value, KraitError> {
        if args.len() != 3 {
            return Err(KraitError::arity_mismatch(3, args.len()));
        }
        let Value::Bool(cond) = &args[0] else {
            return Err(KraitError::WrongArgumentType {
                op: "__if_else__".to_owned(),
                position: 1,
            });
        };
        let branch = if *cond { &args[1] } else { &args[2] };
        self.call_value(branch, &[])
    }

    fn builtin_module(&mut self, args: &[Value]) -> Result<Value, KraitError> {
        if args.len() != 1 {
            return Err(KraitError::arity_mismatch(1, args.len()));
        }
        let Value::Tuple(pairs) = &args[0] else {
            return Err(KraitError::WrongArgumentType {
                op: "__module__".to_owned(),
                position: 1,
            });
        };
        let fields = extract_name_value_pairs(pairs)?;
        Ok(Value::Module(Rc::new(ModuleValue { fields })))
    }

    fn builtin_import(&mut self, args: &[Value]) -> Result<Value, KraitError> {
        if args.len() != 1 {
            return Err(KraitError::arity_mismatch(1, args.len()));
        }
        let Value::Str(name) = &args[0] else {
            return Err(KraitError::WrongArgumentType {
                op: "import".to_owned(),
                position: 1,
            });
        };
        self.import_module(name)
    }

    /// Resolves and evaluates `name` as a module, consulting and updating
    /// the process-wide cache and in-progress stack.
    ///
    /// # Errors
    /// `RUNTIME-13` if the module cannot be resolved or an import cycle is
    /// detected.
    pub fn import_module(&mut self, name: &str) -> Result<Value, KraitError> {
        let path = self
            .modules
            .resolve(name)
            .ok_or_else(|| KraitError::ModuleError {
                message: format!("The module \"{name}\" wasn't found"),
            })?;

        if let Some(cached) = self.modules.cached(&path) {
            return Ok(cached);
        }
        if self.modules.is_loading(&path) {
            return Err(KraitError::ModuleError {
                message: self.modules.cycle_report(),
            });
        }

        let source = std::fs::read_to_string(&path).map_err(|err| KraitError::ModuleError {
            message: format!("Couldn't read module \"{name}\" at {}: {err}", path.display()),
        })?;

        self.modules.push_loading(path.clone());
        let result = (|| {
            let mut parser = crate::frontend::parser::Parser::new(&source)?;
            let stmts = parser.parse_program()?;
            let module_env = self.fresh_module_env(&path);
            self.eval_program(&stmts, &module_env)?;
            let fields: Vec<(String, Value)> = module_env
                .own_names()
                .into_iter()
                .filter_map(|n| {
                    let cell = module_env.lookup(&n)?;
                    force(&cell, |expr, env| self.eval(expr, env)).ok().map(|v| (n, v))
                })
                .collect();
            Ok(Value::Module(Rc::new(ModuleValue { fields })))
        })();
        self.modules.pop_loading();

        let module_value = result?;
        self.modules.cache(path, module_value.clone());
        Ok(module_value)
    }

    fn builtin_import_library(&mut self, args: &[Value]) -> Result<Value, KraitError> {
        if args.len() != 1 {
            return Err(KraitError::arity_mismatch(1, args.len()));
        }
        let Value::Str(name) = &args[0] else {
            return Err(KraitError::WrongArgumentType {
                op: "import_library".to_owned(),
                position: 1,
            });
        };
        self.libraries
            .load(name)
            .map(Value::Library)
    }

    /// Builds the `BuiltinFunction` constructor for a `struct Name(self,
    /// params): body` declaration. Per the specification's own desugaring
    /// (`fn Name(a, b): fn field_factory(self): body`), `body` closes over
    /// the constructor arguments as ordinary bindings — not only through
    /// `self.field` — so each call builds its own child environment
    /// binding `params` (the same convention `call_user_function` uses)
    /// before constructing the zero-argument factory closure; `call_builtin`
    /// runs it eagerly, right after this constructor returns.
    fn build_struct_ctor(&self, name: String, params: crate::frontend::ast::ParamList, body: Block, env: Environment) -> Value {
        let ctor_id = self.fresh_ctor_id();
        Value::BuiltinFunction(Rc::new(BuiltinFunction {
            name: format!("{name}#new"),
            arity: params.len(),
            func: Box::new(move |args| {
                if args.len() != params.len() {
                    return Err(KraitError::arity_mismatch(params.len(), args.len()));
                }
                let ctor_fields: Vec<(String, Value)> =
                    params.iter().map(|p| p.name.clone()).zip(args.iter().cloned()).collect();
                let call_env = env.child();
                for (p, v) in params.iter().zip(args.iter()) {
                    call_env.bind_value(p.name.clone(), v.clone());
                }
                let factory = Rc::new(FunctionValue {
                    name: Some(format!("{name}#factory")),
                    params: Default::default(),
                    body: Rc::clone(&body),
                    env: call_env,
                });
                Ok(Value::Struct(Value::new_struct(
                    name.clone(),
                    ctor_id,
                    ctor_fields,
                    StructFactory::Block(factory),
                )))
            }),
        }))
    }
}

/// An identity for a callable value stable across its lifetime, used as
/// `__struct__`'s constructor-identity argument: a direct call supplies
/// `ctor` as an ordinary value rather than through `fresh_ctor_id`'s
/// per-declaration counter, so the instance's equality key has to come
/// from the value itself.
fn callable_identity(v: &Value) -> Option<usize> {
    match v {
        Value::Function(f) => Some(Rc::as_ptr(f) as usize),
        Value::BuiltinFunction(f) => Some(Rc::as_ptr(f) as usize),
        _ => None,
    }
}

/// Splits a tuple of `(name, value)` 2-tuples — the shape both struct
/// field factories and `__module__` expect — into a `Vec`.
fn extract_name_value_pairs(pairs: &Rc<[Value]>) -> Result<Vec<(String, Value)>, KraitError> {
    let mut out = Vec::with_capacity(pairs.len());
    for pair in pairs.iter() {
        let Value::Tuple(entry) = pair else {
            return Err(KraitError::WrongArgumentType {
                op: "field_factory".to_owned(),
                position: 1,
            });
        };
        let [Value::Str(name), value] = &entry[..] else {
            return Err(KraitError::WrongArgumentType {
                op: "field_factory".to_owned(),
                position: 1,
            });
        };
        out.push((name.to_string(), value.clone()));
    }
    Ok(out)
}

/// Seeds `env` with the global built-ins every fresh environment (the
/// program root, and every freshly loaded module) starts with.
pub fn bind_global_builtins(env: &Environment) {
    for name in [
        "println",
        "print",
        "import",
        "import_library",
        "__if_else__",
        "__tuple__",
        "__module__",
        "__struct__",
    ] {
        env.bind_value(
            name,
            Value::BuiltinFunction(Rc::new(BuiltinFunction {
                name: name.to_owned(),
                arity: 0,
                func: Box::new(|_| unreachable!("dispatched specially in Interpreter::call_builtin")),
            })),
        );
    }
}
