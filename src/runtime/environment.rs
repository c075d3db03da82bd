//! Lexical scope chains and the lazy, memoized bindings (thunks) they hold.

use crate::diagnostics::KraitError;
use crate::frontend::ast::Expr;
use crate::runtime::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A single-assignment lazy cell. Created in the *unevaluated* state;
/// forcing it the first time evaluates its producer and memoizes the
/// result, re-entrant forcing raises `RUNTIME-5`.
#[derive(Debug)]
pub enum Thunk {
    Unevaluated { expr: Rc<Expr>, env: Environment },
    InProgress,
    Evaluated(Value),
}

/// An environment frame: an insertion-ordered name-to-thunk table plus a
/// parent pointer. Cheaply cloneable (an `Rc` to the shared frame), which
/// is how closures capture "the environment at declaration" by value.
#[derive(Debug, Clone)]
pub struct Environment(Rc<RefCell<Frame>>);

#[derive(Debug)]
struct Frame {
    bindings: HashMap<String, Rc<RefCell<Thunk>>>,
    parent: Option<Environment>,
}

impl Environment {
    #[must_use]
    pub fn root() -> Self {
        Self(Rc::new(RefCell::new(Frame {
            bindings: HashMap::new(),
            parent: None,
        })))
    }

    #[must_use]
    pub fn child(&self) -> Self {
        Self(Rc::new(RefCell::new(Frame {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Binds `name` to a lazy, unevaluated thunk producing `expr` when
    /// forced in `env` (normally this same environment, but the caller
    /// decides).
    pub fn bind_lazy(&self, name: impl Into<String>, expr: Rc<Expr>, env: Environment) {
        self.0.borrow_mut().bindings.insert(
            name.into(),
            Rc::new(RefCell::new(Thunk::Unevaluated { expr, env })),
        );
    }

    /// Binds `name` directly to an already-evaluated value (used for
    /// function parameters, which are evaluated eagerly at call time).
    pub fn bind_value(&self, name: impl Into<String>, value: Value) {
        self.0
            .borrow_mut()
            .bindings
            .insert(name.into(), Rc::new(RefCell::new(Thunk::Evaluated(value))));
    }

    /// Finds the thunk cell bound to `name` in this frame or any ancestor.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Rc<RefCell<Thunk>>> {
        let frame = self.0.borrow();
        if let Some(cell) = frame.bindings.get(name) {
            return Some(Rc::clone(cell));
        }
        frame.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// All names bound directly in this frame (not ancestors), in
    /// insertion order is not guaranteed by `HashMap`; callers needing a
    /// stable module export order should track it separately at the call
    /// site (the evaluator does, via the AST's statement order).
    #[must_use]
    pub fn own_names(&self) -> Vec<String> {
        self.0.borrow().bindings.keys().cloned().collect()
    }
}

/// Forces a thunk cell to a value, running the `RUNTIME-5` cycle check.
///
/// # Errors
/// `RUNTIME-5` if the thunk is already being forced (a direct or indirect
/// self-reference); otherwise whatever error evaluating the thunk's
/// expression raises.
pub fn force(
    cell: &Rc<RefCell<Thunk>>,
    eval: impl FnOnce(&Expr, &Environment) -> Result<Value, KraitError>,
) -> Result<Value, KraitError> {
    let (expr, env) = {
        let mut thunk = cell.borrow_mut();
        match &*thunk {
            Thunk::Evaluated(v) => return Ok(v.clone()),
            Thunk::InProgress => return Err(KraitError::ValueCycle),
            Thunk::Unevaluated { expr, env } => {
                let expr = Rc::clone(expr);
                let env = env.clone();
                *thunk = Thunk::InProgress;
                (expr, env)
            }
        }
    };
    let value = eval(&expr, &env)?;
    *cell.borrow_mut() = Thunk::Evaluated(value.clone());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{Expr, ExprKind, Span};

    fn dummy_expr(kind: ExprKind) -> Rc<Expr> {
        Rc::new(Expr::new(kind, Span::new(0, 0)))
    }

    #[test]
    fn lookup_climbs_the_parent_chain() {
        let root = Environment::root();
        root.bind_value("x", Value::Int(1));
        let child = root.child();
        assert!(child.lookup("x").is_some());
        assert!(child.lookup("y").is_none());
    }

    #[test]
    fn a_child_scope_shadows_the_parent_without_mutating_it() {
        let root = Environment::root();
        root.bind_value("x", Value::Int(1));
        let child = root.child();
        child.bind_value("x", Value::Int(2));
        let cell = child.lookup("x").unwrap();
        assert!(matches!(&*cell.borrow(), Thunk::Evaluated(Value::Int(2))));
        let root_cell = root.lookup("x").unwrap();
        assert!(matches!(&*root_cell.borrow(), Thunk::Evaluated(Value::Int(1))));
    }

    #[test]
    fn forcing_an_evaluated_thunk_never_calls_the_producer_again() {
        let env = Environment::root();
        env.bind_value("x", Value::Int(1));
        let cell = env.lookup("x").unwrap();
        let result = force(&cell, |_, _| panic!("should not re-evaluate an already-evaluated thunk"));
        assert!(matches!(result, Ok(Value::Int(1))));
    }

    #[test]
    fn forcing_a_lazy_thunk_runs_its_producer_exactly_once() {
        let env = Environment::root();
        env.bind_lazy("x", dummy_expr(ExprKind::Int(1)), env.clone());
        let cell = env.lookup("x").unwrap();
        let mut calls = 0;
        let result = force(&cell, |_, _| {
            calls += 1;
            Ok(Value::Int(1))
        });
        assert!(matches!(result, Ok(Value::Int(1))));
        assert_eq!(calls, 1);
        // Forcing again must not re-invoke the producer.
        let result = force(&cell, |_, _| panic!("should be memoized"));
        assert!(matches!(result, Ok(Value::Int(1))));
    }

    #[test]
    fn re_entrant_force_raises_a_value_cycle() {
        let env = Environment::root();
        env.bind_lazy("x", dummy_expr(ExprKind::Ident("x".to_owned())), env.clone());
        let cell = env.lookup("x").unwrap();
        let result = force(&cell, |_, env| {
            // Re-enter the same (now in-progress) thunk, as evaluating
            // `Ident("x")` inside its own producer would.
            force(&env.lookup("x").unwrap(), |_, _| panic!("not reached"))
        });
        assert!(matches!(result, Err(KraitError::ValueCycle)));
    }
}
