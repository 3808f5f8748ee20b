//! Walks an `Expr` tree against a `Context`, implementing the typed
//! arithmetic/comparison/access rules of the expression language. Grounded on
//! the structure of the teacher's `Evaluator::apply_binop`/`apply_access`
//! dispatch, but the policy differs throughout: booleans are never numeric,
//! `.` raises on a missing key while `[...]` returns null, and division
//! always produces a float.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::context::{Context, ContextEntry};
use crate::error::{Error, InterpreterError};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::{Number, Value};

pub struct Interpreter<'a> {
    context: &'a Context,
}

impl<'a> Interpreter<'a> {
    pub fn new(context: &'a Context) -> Self {
        Interpreter { context }
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, Error> {
        match expr {
            Expr::Primitive(v) => Ok(v.clone()),
            Expr::ContextValue(name) => self.eval_context_value(name),
            Expr::Unary { op, expr } => self.eval_unary(*op, expr),
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Access { target, is_interval, index, left, right } => {
                self.eval_access(target, *is_interval, index.as_deref(), left.as_deref(), right.as_deref())
            }
            Expr::FunctionCall { callee, args } => self.eval_call(callee, args),
            Expr::List(items) => {
                let values = items.iter().map(|e| self.eval(e)).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
            Expr::Object(entries) => {
                let mut map = std::collections::BTreeMap::new();
                for (k, v) in entries {
                    map.insert(k.clone(), self.eval(v)?);
                }
                Ok(Value::Object(map))
            }
        }
    }

    fn eval_context_value(&self, name: &str) -> Result<Value, Error> {
        match self.context.get(name) {
            Some(ContextEntry::Value(v)) => Ok(v.clone()),
            Some(ContextEntry::Function(_)) => {
                Err(InterpreterError::type_error(format!("{} is a function and must be called", name)).into())
            }
            None => Err(InterpreterError::UnknownContextValue(name.to_string()).into()),
        }
    }

    fn eval_unary(&self, op: UnaryOp, expr: &Expr) -> Result<Value, Error> {
        let value = self.eval(expr)?;
        match op {
            UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
            UnaryOp::Pos => Ok(Value::Number(as_number(&value, "+")?)),
            UnaryOp::Neg => {
                let n = as_number(&value, "-")?;
                Ok(if n.is_integer() {
                    Value::integer(-n.as_i64().unwrap())
                } else {
                    Value::float(-n.as_f64())
                })
            }
        }
    }

    fn eval_binary(&self, op: BinOp, left: &Expr, right: &Expr) -> Result<Value, Error> {
        match op {
            BinOp::Or => {
                let l = self.eval(left)?;
                if l.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let r = self.eval(right)?;
                Ok(Value::Bool(r.is_truthy()))
            }
            BinOp::And => {
                let l = self.eval(left)?;
                if !l.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let r = self.eval(right)?;
                Ok(Value::Bool(r.is_truthy()))
            }
            BinOp::Dot => {
                let l = self.eval(left)?;
                let key = match right {
                    Expr::Primitive(Value::String(s)) => s.clone(),
                    other => match self.eval(other)? {
                        Value::String(s) => s,
                        _ => return Err(InterpreterError::type_error("'.' requires a property name").into()),
                    },
                };
                match l {
                    Value::Object(map) => match map.get(&key) {
                        Some(v) => Ok(v.clone()),
                        None => Err(Error::template(format!(
                            "\"{}\" not found in {}",
                            key,
                            crate::json_compat::to_json_string(&Value::Object(map))
                        ))),
                    },
                    other => Err(InterpreterError::type_error(format!(
                        "infix: '.' requires an object, found {}",
                        other.type_name()
                    ))
                    .into()),
                }
            }
            BinOp::In => self.eval_in(left, right),
            BinOp::Eq => Ok(Value::Bool(self.eval(left)? == self.eval(right)?)),
            BinOp::NotEq => Ok(Value::Bool(self.eval(left)? != self.eval(right)?)),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => self.eval_comparison(op, left, right),
            BinOp::Add => self.eval_add(left, right),
            BinOp::Sub => self.eval_arith(left, right, "-", |a, b| a - b),
            BinOp::Mul => self.eval_arith(left, right, "*", |a, b| a * b),
            BinOp::Div => self.eval_div(left, right),
            BinOp::Pow => self.eval_pow(left, right),
        }
    }

    fn eval_in(&self, left: &Expr, right: &Expr) -> Result<Value, Error> {
        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match r {
            Value::Object(map) => match l {
                Value::String(s) => Ok(Value::Bool(map.contains_key(&s))),
                _ => Err(InterpreterError::type_error("'in' requires a string on the left of an object").into()),
            },
            Value::String(haystack) => match l {
                Value::String(needle) => Ok(Value::Bool(haystack.contains(&needle))),
                _ => Err(InterpreterError::type_error("'in' requires a string on the left of a string").into()),
            },
            Value::Array(items) => Ok(Value::Bool(items.contains(&l))),
            _ => Err(InterpreterError::type_error("'in' requires an object, string, or array on the right").into()),
        }
    }

    fn eval_comparison(&self, op: BinOp, left: &Expr, right: &Expr) -> Result<Value, Error> {
        let l = self.eval(left)?;
        let r = self.eval(right)?;
        let ordering = match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => {
                return Err(InterpreterError::type_error(
                    "comparisons require two numbers or two strings of the same type",
                )
                .into())
            }
        };
        let ordering = ordering.ok_or_else(|| InterpreterError::type_error("values are not comparable"))?;
        let result = match op {
            BinOp::Lt => ordering.is_lt(),
            BinOp::Le => ordering.is_le(),
            BinOp::Gt => ordering.is_gt(),
            BinOp::Ge => ordering.is_ge(),
            _ => unreachable!(),
        };
        Ok(Value::Bool(result))
    }

    fn eval_add(&self, left: &Expr, right: &Expr) -> Result<Value, Error> {
        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(add_numbers(*a, *b))),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => Err(InterpreterError::type_error(
                "+ requires two numbers or two strings, not a mix",
            )
            .into()),
        }
    }

    fn eval_arith(&self, left: &Expr, right: &Expr, op_name: &str, f: impl Fn(f64, f64) -> f64) -> Result<Value, Error> {
        let l = as_number(&self.eval(left)?, op_name)?;
        let r = as_number(&self.eval(right)?, op_name)?;
        let value = f(l.as_f64(), r.as_f64());
        Ok(Value::Number(if l.is_integer() && r.is_integer() {
            Number::integer(value as i64)
        } else {
            Number::float(value)
        }))
    }

    fn eval_div(&self, left: &Expr, right: &Expr) -> Result<Value, Error> {
        let l = as_number(&self.eval(left)?, "/")?;
        let r = as_number(&self.eval(right)?, "/")?;
        if r.as_f64() == 0.0 {
            return Err(InterpreterError::DivisionByZero.into());
        }
        // True division, matching the reference interpreter: always a float,
        // even when the result happens to be a whole number.
        Ok(Value::float(l.as_f64() / r.as_f64()))
    }

    fn eval_pow(&self, left: &Expr, right: &Expr) -> Result<Value, Error> {
        let base = as_number(&self.eval(left)?, "**")?;
        let exp = as_number(&self.eval(right)?, "**")?;
        Ok(Value::Number(pow_numbers(base, exp)))
    }

    fn eval_access(
        &self,
        target: &Expr,
        is_interval: bool,
        index: Option<&Expr>,
        left: Option<&Expr>,
        right: Option<&Expr>,
    ) -> Result<Value, Error> {
        let target_value = self.eval(target)?;
        if is_interval {
            return self.eval_slice(&target_value, left, right);
        }
        let index_value = self.eval(index.expect("non-interval access always carries an index"))?;
        match &target_value {
            Value::Array(items) => {
                let i = as_index(&index_value)?;
                let idx = normalize_index(i, items.len())?;
                Ok(items[idx].clone())
            }
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = as_index(&index_value)?;
                let idx = normalize_index(i, chars.len())?;
                Ok(Value::String(chars[idx].to_string()))
            }
            Value::Object(map) => match &index_value {
                Value::String(key) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
                _ => Err(InterpreterError::type_error("infix: '[..]' requires a string index").into()),
            },
            other => Err(InterpreterError::type_error(format!(
                "infix: '[..]' requires an object, array, or string, found {}",
                other.type_name()
            ))
            .into()),
        }
    }

    fn eval_slice(&self, target: &Value, left: Option<&Expr>, right: Option<&Expr>) -> Result<Value, Error> {
        let len = match target {
            Value::Array(items) => items.len(),
            Value::String(s) => s.chars().count(),
            other => {
                return Err(InterpreterError::type_error(format!(
                    "slicing requires an array or string, found {}",
                    other.type_name()
                ))
                .into())
            }
        };
        let start = match left {
            Some(e) => clamp_slice_index(as_index(&self.eval(e)?)?, len),
            None => 0,
        };
        let end = match right {
            Some(e) => clamp_slice_index(as_index(&self.eval(e)?)?, len),
            None => len,
        };
        let (start, end) = if start > end { (start, start) } else { (start, end) };
        match target {
            Value::Array(items) => Ok(Value::Array(items[start..end].to_vec())),
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                Ok(Value::String(chars[start..end].iter().collect()))
            }
            _ => unreachable!(),
        }
    }

    fn eval_call(&self, callee: &Expr, args: &[Expr]) -> Result<Value, Error> {
        let name = match callee {
            Expr::ContextValue(name) => name.clone(),
            other => {
                // Whatever this evaluates to is a plain Value, which is
                // never callable in this language.
                let value = self.eval(other)?;
                return Err(InterpreterError::NotCallable(value.type_name().to_string()).into());
            }
        };
        let f = match self.context.get(&name) {
            Some(ContextEntry::Function(f)) => f.clone(),
            Some(ContextEntry::Value(_)) => return Err(InterpreterError::NotCallable(name).into()),
            None => return Err(InterpreterError::UnknownContextValue(name).into()),
        };
        let evaluated = args.iter().map(|a| self.eval(a)).collect::<Result<Vec<_>, _>>()?;
        Ok(f(&evaluated)?)
    }
}

fn as_number(v: &Value, op: &str) -> Result<Number, Error> {
    match v {
        Value::Number(n) => Ok(*n),
        other => Err(InterpreterError::type_error(format!(
            "{} requires a number, found {}",
            op,
            other.type_name()
        ))
        .into()),
    }
}

fn as_index(v: &Value) -> Result<i64, Error> {
    match v {
        Value::Number(n) if n.is_integer() => Ok(n.as_i64().unwrap()),
        Value::Number(_) => {
            Err(InterpreterError::type_error("should only use integers to access arrays or strings").into())
        }
        other => Err(InterpreterError::type_error(format!(
            "should only use integers to access arrays or strings, found {}",
            other.type_name()
        ))
        .into()),
    }
}

fn normalize_index(i: i64, len: usize) -> Result<usize, Error> {
    let effective = if i < 0 { i + len as i64 } else { i };
    if effective < 0 || effective as usize >= len {
        Err(InterpreterError::IndexOutOfBounds.into())
    } else {
        Ok(effective as usize)
    }
}

fn clamp_slice_index(i: i64, len: usize) -> usize {
    let effective = if i < 0 { i + len as i64 } else { i };
    effective.clamp(0, len as i64) as usize
}

fn add_numbers(a: Number, b: Number) -> Number {
    if a.is_integer() && b.is_integer() {
        Number::integer(a.as_i64().unwrap() + b.as_i64().unwrap())
    } else {
        Number::float(a.as_f64() + b.as_f64())
    }
}

fn pow_numbers(base: Number, exp: Number) -> Number {
    let value = base.as_f64().powf(exp.as_f64());
    if base.is_integer() && exp.is_integer() && exp.as_f64() >= 0.0 {
        if let (Some(b), Some(e)) = (base.as_i64(), exp.as_i64()) {
            if let Ok(e_u32) = u32::try_from(e) {
                if let Some(r) = b.checked_pow(e_u32) {
                    return Number::integer(r);
                }
            }
        }
    }
    Number::float(value)
}

/// Parses `src` as a standalone expression and evaluates it against `ctx`.
/// Used by `$eval`, `$if`'s condition, and `$sort`'s `by(..)` clause, all of
/// which work against raw expression source text rather than a template.
pub fn eval_str(src: &str, ctx: &Context) -> Result<Value, Error> {
    let lexer = Lexer::new(src);
    let mut parser = Parser::new(lexer)?;
    let expr = parser.parse_expression_to_end()?;
    Interpreter::new(ctx).eval(&expr)
}
