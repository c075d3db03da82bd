//! The per-kind "capability vtable": built-in method tables for every
//! value kind except struct instances and modules, which the interpreter
//! handles directly since they need evaluator access (factory execution,
//! import resolution).

use crate::diagnostics::KraitError;
use crate::runtime::value::{format_float, BuiltinFunction, Value};
use std::rc::Rc;

fn bound(name: &str, arity: usize, f: impl Fn(&[Value]) -> Result<Value, KraitError> + 'static) -> Value {
    Value::BuiltinFunction(Rc::new(BuiltinFunction {
        name: name.to_owned(),
        arity,
        func: Box::new(f),
    }))
}

fn expect_int(v: &Value, op: &str, position: usize) -> Result<i64, KraitError> {
    match v {
        Value::Int(i) => Ok(*i),
        _ => Err(KraitError::WrongArgumentType {
            op: op.to_owned(),
            position,
        }),
    }
}

fn expect_float(v: &Value, op: &str, position: usize) -> Result<f64, KraitError> {
    match v {
        Value::Float(f) => Ok(*f),
        _ => Err(KraitError::WrongArgumentType {
            op: op.to_owned(),
            position,
        }),
    }
}

fn expect_str<'a>(v: &'a Value, op: &str, position: usize) -> Result<&'a str, KraitError> {
    match v {
        Value::Str(s) => Ok(s),
        _ => Err(KraitError::WrongArgumentType {
            op: op.to_owned(),
            position,
        }),
    }
}

fn expect_tuple<'a>(v: &'a Value, op: &str, position: usize) -> Result<&'a Rc<[Value]>, KraitError> {
    match v {
        Value::Tuple(t) => Ok(t),
        _ => Err(KraitError::WrongArgumentType {
            op: op.to_owned(),
            position,
        }),
    }
}

/// Looks up `name` on `receiver`'s built-in method table. Returns `None`
/// for struct instances and modules (the interpreter resolves those
/// itself) and for any name the receiver's kind does not publish.
#[must_use]
pub fn select_field(receiver: &Value, name: &str) -> Option<Value> {
    match receiver {
        Value::Int(v) => int_field(*v, name),
        Value::Float(v) => float_field(*v, name),
        Value::Bool(v) => bool_field(*v, name),
        Value::Str(v) => string_field(Rc::clone(v), name),
        Value::Tuple(v) => tuple_field(Rc::clone(v), name),
        Value::Unit => unit_field(name),
        Value::Function(_) | Value::BuiltinFunction(_) => callable_field(receiver.clone(), name),
        Value::Library(_) | Value::Struct(_) | Value::Module(_) => None,
    }
}

fn int_field(lhs: i64, name: &str) -> Option<Value> {
    Some(match name {
        "+" => bound("+", 1, move |a| Ok(Value::Int(lhs + expect_int(&a[0], "+", 1)?))),
        "-" => bound("-", 1, move |a| Ok(Value::Int(lhs - expect_int(&a[0], "-", 1)?))),
        "*" => bound("*", 1, move |a| Ok(Value::Int(lhs * expect_int(&a[0], "*", 1)?))),
        "/" => bound("/", 1, move |a| {
            let rhs = expect_int(&a[0], "/", 1)?;
            if rhs == 0 {
                return Err(KraitError::DivisionByZero { op: "int#/".to_owned() });
            }
            Ok(Value::Int(lhs.div_euclid(rhs)))
        }),
        "%" => bound("%", 1, move |a| {
            let rhs = expect_int(&a[0], "%", 1)?;
            if rhs == 0 {
                return Err(KraitError::DivisionByZero { op: "int#%".to_owned() });
            }
            Ok(Value::Int(lhs.rem_euclid(rhs)))
        }),
        "==" => bound("==", 1, move |a| Ok(Value::Bool(matches!(&a[0], Value::Int(r) if *r == lhs)))),
        "!=" => bound("!=", 1, move |a| Ok(Value::Bool(!matches!(&a[0], Value::Int(r) if *r == lhs)))),
        "<" => bound("<", 1, move |a| Ok(Value::Bool(lhs < expect_int(&a[0], "<", 1)?))),
        "<=" => bound("<=", 1, move |a| Ok(Value::Bool(lhs <= expect_int(&a[0], "<=", 1)?))),
        ">" => bound(">", 1, move |a| Ok(Value::Bool(lhs > expect_int(&a[0], ">", 1)?))),
        ">=" => bound(">=", 1, move |a| Ok(Value::Bool(lhs >= expect_int(&a[0], ">=", 1)?))),
        "neg" => bound("neg", 0, move |_| Ok(Value::Int(-lhs))),
        "to_str" => bound("to_str", 0, move |_| Ok(Value::Str(lhs.to_string().into()))),
        "to_character" => bound("to_character", 0, move |_| {
            let ch = char::from_u32(u32::try_from(lhs).unwrap_or(0xFFFD)).unwrap_or('\u{FFFD}');
            Ok(Value::Str(ch.to_string().into()))
        }),
        _ => return None,
    })
}

fn float_field(lhs: f64, name: &str) -> Option<Value> {
    Some(match name {
        "+" => bound("+", 1, move |a| Ok(Value::Float(lhs + expect_float(&a[0], "+", 1)?))),
        "-" => bound("-", 1, move |a| Ok(Value::Float(lhs - expect_float(&a[0], "-", 1)?))),
        "*" => bound("*", 1, move |a| Ok(Value::Float(lhs * expect_float(&a[0], "*", 1)?))),
        "/" => bound("/", 1, move |a| {
            let rhs = expect_float(&a[0], "/", 1)?;
            if rhs == 0.0 {
                return Err(KraitError::DivisionByZero {
                    op: "float#/".to_owned(),
                });
            }
            Ok(Value::Float(lhs / rhs))
        }),
        "%" => bound("%", 1, move |a| {
            let rhs = expect_float(&a[0], "%", 1)?;
            if rhs == 0.0 {
                return Err(KraitError::DivisionByZero {
                    op: "float#%".to_owned(),
                });
            }
            Ok(Value::Float(lhs.rem_euclid(rhs)))
        }),
        "==" => bound("==", 1, move |a| Ok(Value::Bool(matches!(&a[0], Value::Float(r) if *r == lhs)))),
        "!=" => bound("!=", 1, move |a| Ok(Value::Bool(!matches!(&a[0], Value::Float(r) if *r == lhs)))),
        "<" => bound("<", 1, move |a| Ok(Value::Bool(lhs < expect_float(&a[0], "<", 1)?))),
        "<=" => bound("<=", 1, move |a| Ok(Value::Bool(lhs <= expect_float(&a[0], "<=", 1)?))),
        ">" => bound(">", 1, move |a| Ok(Value::Bool(lhs > expect_float(&a[0], ">", 1)?))),
        ">=" => bound(">=", 1, move |a| Ok(Value::Bool(lhs >= expect_float(&a[0], ">=", 1)?))),
        "neg" => bound("neg", 0, move |_| Ok(Value::Float(-lhs))),
        "to_str" => bound("to_str", 0, move |_| Ok(Value::Str(format_float(lhs).into()))),
        _ => return None,
    })
}

fn bool_field(lhs: bool, name: &str) -> Option<Value> {
    Some(match name {
        "&&" => bound("&&", 1, move |a| {
            Ok(Value::Bool(lhs && matches!(&a[0], Value::Bool(true))))
        }),
        "||" => bound("||", 1, move |a| {
            Ok(Value::Bool(lhs || matches!(&a[0], Value::Bool(true))))
        }),
        "!" => bound("!", 0, move |_| Ok(Value::Bool(!lhs))),
        "==" => bound("==", 1, move |a| Ok(Value::Bool(matches!(&a[0], Value::Bool(r) if *r == lhs)))),
        "!=" => bound("!=", 1, move |a| Ok(Value::Bool(!matches!(&a[0], Value::Bool(r) if *r == lhs)))),
        "to_str" => bound("to_str", 0, move |_| Ok(Value::Str(lhs.to_string().into()))),
        _ => return None,
    })
}

fn string_field(lhs: Rc<str>, name: &str) -> Option<Value> {
    Some(match name {
        "length" => Value::Int(i64::try_from(lhs.chars().count()).unwrap_or(i64::MAX)),
        "+" => {
            let lhs = Rc::clone(&lhs);
            bound("+", 1, move |a| {
                let rhs = expect_str(&a[0], "+", 1)?;
                Ok(Value::Str(format!("{lhs}{rhs}").into()))
            })
        }
        "==" => {
            let lhs = Rc::clone(&lhs);
            bound("==", 1, move |a| {
                Ok(Value::Bool(matches!(&a[0], Value::Str(r) if **r == *lhs)))
            })
        }
        "!=" => {
            let lhs = Rc::clone(&lhs);
            bound("!=", 1, move |a| {
                Ok(Value::Bool(!matches!(&a[0], Value::Str(r) if **r == *lhs)))
            })
        }
        "to_str" => {
            let lhs = Rc::clone(&lhs);
            bound("to_str", 0, move |_| Ok(Value::Str(Rc::clone(&lhs))))
        }
        "get" => {
            let lhs = Rc::clone(&lhs);
            bound("get", 1, move |a| {
                let idx = expect_int(&a[0], "get", 1)?;
                let chars: Vec<char> = lhs.chars().collect();
                let Ok(uidx) = usize::try_from(idx) else {
                    return Err(KraitError::IndexOutOfBounds {
                        op: "string#get".to_owned(),
                        index: idx,
                        len: chars.len(),
                    });
                };
                chars.get(uidx).map(|c| Value::Str(c.to_string().into())).ok_or(
                    KraitError::IndexOutOfBounds {
                        op: "string#get".to_owned(),
                        index: idx,
                        len: chars.len(),
                    },
                )
            })
        }
        "slice" => {
            let lhs = Rc::clone(&lhs);
            bound("slice", 2, move |a| {
                let lo = expect_int(&a[0], "slice", 1)?;
                let hi = expect_int(&a[1], "slice", 2)?;
                let chars: Vec<char> = lhs.chars().collect();
                let (lo, hi) = clamp_range(lo, hi, chars.len());
                Ok(Value::Str(chars[lo..hi].iter().collect::<String>().into()))
            })
        }
        "split" => {
            let lhs = Rc::clone(&lhs);
            bound("split", 1, move |a| {
                let sep = expect_str(&a[0], "split", 1)?;
                let parts: Vec<Value> = if sep.is_empty() {
                    vec![Value::Str(Rc::clone(&lhs))]
                } else {
                    lhs.split(sep).map(|p| Value::Str(p.into())).collect()
                };
                Ok(Value::Tuple(parts.into()))
            })
        }
        "strip" => {
            let lhs = Rc::clone(&lhs);
            bound("strip", 1, move |a| {
                let chars = expect_str(&a[0], "strip", 1)?;
                let set: Vec<char> = chars.chars().collect();
                Ok(Value::Str(lhs.trim_matches(|c| set.contains(&c)).to_owned().into()))
            })
        }
        "codepoint" => {
            let lhs = Rc::clone(&lhs);
            bound("codepoint", 0, move |_| {
                let len = lhs.chars().count();
                if len != 1 {
                    return Err(KraitError::NotASingleCodepoint { len });
                }
                let c = lhs.chars().next().unwrap();
                Ok(Value::Int(i64::from(u32::from(c))))
            })
        }
        _ => return None,
    })
}

fn tuple_field(lhs: Rc<[Value]>, name: &str) -> Option<Value> {
    Some(match name {
        "length" => Value::Int(i64::try_from(lhs.len()).unwrap_or(i64::MAX)),
        "get" => {
            let lhs = Rc::clone(&lhs);
            bound("get", 1, move |a| {
                let idx = expect_int(&a[0], "get", 1)?;
                let Ok(uidx) = usize::try_from(idx) else {
                    return Err(KraitError::IndexOutOfBounds {
                        op: "tuple#get".to_owned(),
                        index: idx,
                        len: lhs.len(),
                    });
                };
                lhs.get(uidx).cloned().ok_or(KraitError::IndexOutOfBounds {
                    op: "tuple#get".to_owned(),
                    index: idx,
                    len: lhs.len(),
                })
            })
        }
        "+" => {
            let lhs = Rc::clone(&lhs);
            bound("+", 1, move |a| {
                let rhs = expect_tuple(&a[0], "+", 1)?;
                let combined: Vec<Value> = lhs.iter().chain(rhs.iter()).cloned().collect();
                Ok(Value::Tuple(combined.into()))
            })
        }
        "*" => {
            let lhs = Rc::clone(&lhs);
            bound("*", 1, move |a| {
                let n = expect_int(&a[0], "*", 1)?;
                if n <= 0 {
                    return Ok(Value::Tuple(Rc::from([])));
                }
                let mut out = Vec::with_capacity(lhs.len() * usize::try_from(n).unwrap_or(0));
                for _ in 0..n {
                    out.extend(lhs.iter().cloned());
                }
                Ok(Value::Tuple(out.into()))
            })
        }
        "slice" => {
            let lhs = Rc::clone(&lhs);
            bound("slice", 2, move |a| {
                let lo = expect_int(&a[0], "slice", 1)?;
                let hi = expect_int(&a[1], "slice", 2)?;
                let (lo, hi) = clamp_range(lo, hi, lhs.len());
                Ok(Value::Tuple(lhs[lo..hi].to_vec().into()))
            })
        }
        "==" => {
            let lhs = Value::Tuple(Rc::clone(&lhs));
            bound("==", 1, move |a| Ok(Value::Bool(Value::values_equal(&lhs, &a[0]))))
        }
        "!=" => {
            let lhs = Value::Tuple(Rc::clone(&lhs));
            bound("!=", 1, move |a| Ok(Value::Bool(!Value::values_equal(&lhs, &a[0]))))
        }
        "to_str" => {
            let lhs = Value::Tuple(lhs);
            bound("to_str", 0, move |_| Ok(Value::Str(lhs.to_display_string().into())))
        }
        _ => return None,
    })
}

fn unit_field(name: &str) -> Option<Value> {
    Some(match name {
        "==" => bound("==", 1, |a| Ok(Value::Bool(matches!(a[0], Value::Unit)))),
        "!=" => bound("!=", 1, |a| Ok(Value::Bool(!matches!(a[0], Value::Unit)))),
        "to_str" => bound("to_str", 0, |_| Ok(Value::Str("(unit)".into()))),
        _ => return None,
    })
}

fn callable_field(lhs: Value, name: &str) -> Option<Value> {
    Some(match name {
        "==" => bound("==", 1, move |a| Ok(Value::Bool(Value::values_equal(&lhs, &a[0])))),
        "!=" => {
            let lhs2 = lhs.clone();
            bound("!=", 1, move |a| Ok(Value::Bool(!Value::values_equal(&lhs2, &a[0]))))
        }
        "to_str" => {
            let lhs2 = lhs.clone();
            bound("to_str", 0, move |_| Ok(Value::Str(lhs2.to_display_string().into())))
        }
        _ => return None,
    })
}

/// Clamps `[lo, hi)` into `[0, len]`, matching `slice`'s "never panics,
/// just produces an empty result if the requested range is reversed or
/// out of range" behavior.
fn clamp_range(lo: i64, hi: i64, len: usize) -> (usize, usize) {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let lo = lo.clamp(0, len);
    let hi = hi.clamp(0, len);
    if hi < lo {
        (lo as usize, lo as usize)
    } else {
        (lo as usize, hi as usize)
    }
}
