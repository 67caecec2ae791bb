//! The tree-walking interpreter.
//!
//! Statements and expressions are walked directly; every call site and
//! operator node dispatches through the binding computed by `shard-sema`,
//! never by re-resolving. The parameter-passing contract falls out of
//! [`Value`]'s clone semantics: primitives and strings copy, arrays and
//! objects copy their heap handle and share the referent. Reassigning a
//! parameter variable rebinds the local slot only.

use std::collections::BTreeMap;

use shard_sema::{
    Analysis, Binding, BuiltinMethod, BuiltinOp, MethodKind, MethodRef, OperatorKind, OperatorRef,
};
use shard_types::ast::*;

use crate::console::Console;
use crate::env::Environment;
use crate::error::{EvalResult, RuntimeError};
use crate::heap::Heap;
use crate::value::{ObjRef, Value};

/// Frame limit before a run fails with [`RuntimeError::StackExhausted`].
///
/// A tree-walker burns host stack for every interpreted frame, so the
/// engine counts frames explicitly instead of riding the host stack into
/// an abort.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Run a bound program's entry point against the given console.
pub fn run<C: Console>(
    program: &Program,
    analysis: &Analysis,
    console: &mut C,
) -> EvalResult<()> {
    Interpreter::new(program, analysis, console).run()
}

/// One call frame: scoped locals plus the receiver, if any.
#[derive(Debug)]
struct Frame {
    env: Environment,
    this: Option<Value>,
}

/// The interpreter for one program run.
pub struct Interpreter<'p, C: Console> {
    program: &'p Program,
    analysis: &'p Analysis,
    console: &'p mut C,
    heap: Heap,
    frames: Vec<Frame>,
    max_depth: usize,
}

impl<'p, C: Console> Interpreter<'p, C> {
    pub fn new(program: &'p Program, analysis: &'p Analysis, console: &'p mut C) -> Self {
        Self {
            program,
            analysis,
            console,
            heap: Heap::new(),
            frames: Vec::new(),
            max_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Override the frame limit (tests use a small one).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Execute the program's `Main`.
    pub fn run(&mut self) -> EvalResult<()> {
        self.call_user_method(self.analysis.entry, None, Vec::new())
            .map(|_| ())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Program access
    // ══════════════════════════════════════════════════════════════════════

    fn method_decl(&self, r: MethodRef) -> &'p MethodDecl {
        &self.program.namespaces[r.ns].classes[r.class].methods[r.method]
    }

    fn operator_decl(&self, r: OperatorRef) -> &'p OperatorDecl {
        &self.program.namespaces[r.ns].classes[r.class].operators[r.operator]
    }

    fn binding(&self, id: NodeId) -> Option<&'p Binding> {
        self.analysis.bindings.get(&id)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Frames & calls
    // ══════════════════════════════════════════════════════════════════════

    fn guard_depth(&self) -> EvalResult<()> {
        if self.frames.len() >= self.max_depth {
            return Err(RuntimeError::StackExhausted(self.max_depth));
        }
        Ok(())
    }

    fn frame(&self) -> EvalResult<&Frame> {
        self.frames
            .last()
            .ok_or_else(|| RuntimeError::Internal("no active frame".to_string()))
    }

    fn frame_mut(&mut self) -> EvalResult<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| RuntimeError::Internal("no active frame".to_string()))
    }

    fn current_this(&self) -> EvalResult<ObjRef> {
        match self.frame()?.this {
            Some(Value::Object(handle)) => Ok(handle),
            _ => Err(RuntimeError::Internal(
                "no receiver in the current frame".to_string(),
            )),
        }
    }

    /// Push a frame seeded with parameters, run the body, consume `return`.
    fn call_user_method(
        &mut self,
        r: MethodRef,
        this: Option<Value>,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        let method = self.method_decl(r);
        self.guard_depth()?;
        let mut env = Environment::new();
        for (param, value) in method.params.iter().zip(args) {
            env.define(&param.name.name, value);
        }
        self.frames.push(Frame { env, this });
        let outcome = self.exec_stmts(&method.body);
        self.frames.pop();
        finish_call(outcome)
    }

    /// Operator bodies run like static two-parameter methods.
    fn call_operator(&mut self, r: OperatorRef, args: Vec<Value>) -> EvalResult<Value> {
        let operator = self.operator_decl(r);
        self.guard_depth()?;
        let mut env = Environment::new();
        for (param, value) in operator.params.iter().zip(args) {
            env.define(&param.name.name, value);
        }
        self.frames.push(Frame { env, this: None });
        let outcome = self.exec_stmts(&operator.body);
        self.frames.pop();
        finish_call(outcome)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn exec_stmts(&mut self, stmts: &'p [Stmt]) -> EvalResult<()> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &'p Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::VarDecl(decl) => {
                let value = match &decl.init {
                    Some(init) => self.eval_expr(init)?,
                    None => zero_from_annotation(&decl.ty),
                };
                self.frame_mut()?.env.define(&decl.name.name, value);
                Ok(())
            }
            Stmt::Expr(s) => {
                self.eval_expr(&s.expr)?;
                Ok(())
            }
            Stmt::If(s) => {
                if self.eval_condition(&s.condition)? {
                    self.exec_stmt(&s.then_branch)
                } else if let Some(else_branch) = &s.else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(s) => {
                while self.eval_condition(&s.condition)? {
                    self.exec_stmt(&s.body)?;
                }
                Ok(())
            }
            Stmt::DoWhile(s) => {
                loop {
                    self.exec_stmt(&s.body)?;
                    if !self.eval_condition(&s.condition)? {
                        break;
                    }
                }
                Ok(())
            }
            Stmt::For(s) => {
                self.frame_mut()?.env.push_scope();
                let outcome = self.exec_for(s);
                self.frame_mut()?.env.pop_scope();
                outcome
            }
            Stmt::Return(s) => {
                let value = match &s.value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Void,
                };
                Err(RuntimeError::Return(value))
            }
            Stmt::Block(s) => {
                self.frame_mut()?.env.push_scope();
                let outcome = self.exec_stmts(&s.stmts);
                self.frame_mut()?.env.pop_scope();
                outcome
            }
            Stmt::Empty(_) => Ok(()),
        }
    }

    fn exec_for(&mut self, s: &'p ForStmt) -> EvalResult<()> {
        match &s.init {
            Some(ForInit::VarDecl(decl)) => {
                let value = match &decl.init {
                    Some(init) => self.eval_expr(init)?,
                    None => zero_from_annotation(&decl.ty),
                };
                self.frame_mut()?.env.define(&decl.name.name, value);
            }
            Some(ForInit::Expr(expr)) => {
                self.eval_expr(expr)?;
            }
            None => {}
        }
        loop {
            if let Some(cond) = &s.condition {
                if !self.eval_condition(cond)? {
                    return Ok(());
                }
            }
            self.exec_stmt(&s.body)?;
            if let Some(step) = &s.step {
                self.eval_expr(step)?;
            }
        }
    }

    fn eval_condition(&mut self, condition: &'p Expr) -> EvalResult<bool> {
        as_bool(self.eval_expr(condition)?)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn eval_expr(&mut self, expr: &'p Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::IntLit(v) => Ok(Value::Int(*v)),
            ExprKind::BoolLit(v) => Ok(Value::Bool(*v)),
            ExprKind::CharLit(v) => Ok(Value::Char(*v)),
            ExprKind::StringLit(v) => Ok(Value::Str(v.clone())),
            ExprKind::NullLit => Ok(Value::Null),

            ExprKind::Ident(name) => self.eval_ident(expr.id, name),
            ExprKind::Field { recv, name } => self.eval_field(expr.id, recv, name),
            ExprKind::Index { recv, index } => self.eval_index(recv, index),
            ExprKind::Call { recv, name, args } => {
                self.eval_call(expr.id, recv.as_deref(), name, args)
            }
            ExprKind::New { .. } => self.eval_new(expr.id),
            ExprKind::NewArray { len, .. } => self.eval_new_array(expr.id, len),
            ExprKind::Unary { operand, .. } => self.eval_unary(expr.id, operand),
            ExprKind::Binary { lhs, rhs, .. } => self.eval_binary(expr.id, lhs, rhs),
            ExprKind::Assign { target, value } => self.eval_assign(target, value),
            ExprKind::Paren(inner) => self.eval_expr(inner),
        }
    }

    fn eval_ident(&mut self, id: NodeId, name: &str) -> EvalResult<Value> {
        if matches!(self.binding(id), Some(Binding::ImplicitField)) {
            let this = self.current_this()?;
            return self
                .heap
                .object(this)
                .fields
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::Internal(format!("missing field '{name}'")));
        }
        self.frame()?
            .env
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::Internal(format!("unknown local '{name}'")))
    }

    fn eval_field(&mut self, id: NodeId, recv: &'p Expr, name: &Ident) -> EvalResult<Value> {
        match self.binding(id) {
            Some(Binding::ArrayLength) => match self.eval_expr(recv)? {
                Value::Array(handle) => Ok(Value::Int(self.heap.array(handle).items.len() as i32)),
                Value::Null => Err(RuntimeError::NullReference(
                    "cannot read 'Length' of a null array".to_string(),
                )),
                other => Err(internal_operand("array", &other)),
            },
            Some(Binding::StringLength) => match self.eval_expr(recv)? {
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i32)),
                other => Err(internal_operand("string", &other)),
            },
            Some(Binding::Field { .. }) => match self.eval_expr(recv)? {
                Value::Object(handle) => self
                    .heap
                    .object(handle)
                    .fields
                    .get(&name.name)
                    .cloned()
                    .ok_or_else(|| {
                        RuntimeError::Internal(format!("missing field '{}'", name.name))
                    }),
                Value::Null => Err(RuntimeError::NullReference(format!(
                    "cannot read field '{}' of null",
                    name.name
                ))),
                other => Err(internal_operand("object", &other)),
            },
            _ => Err(RuntimeError::Internal(format!(
                "unbound field access '{}'",
                name.name
            ))),
        }
    }

    fn eval_index(&mut self, recv: &'p Expr, index: &'p Expr) -> EvalResult<Value> {
        let recv_value = self.eval_expr(recv)?;
        let idx = as_int(self.eval_expr(index)?)?;
        match recv_value {
            Value::Array(handle) => {
                let items = &self.heap.array(handle).items;
                if idx < 0 || idx as usize >= items.len() {
                    return Err(RuntimeError::IndexOutOfRange {
                        index: idx,
                        len: items.len(),
                    });
                }
                Ok(items[idx as usize].clone())
            }
            Value::Null => Err(RuntimeError::NullReference(
                "cannot index a null array".to_string(),
            )),
            other => Err(internal_operand("array", &other)),
        }
    }

    fn eval_call(
        &mut self,
        id: NodeId,
        recv: Option<&'p Expr>,
        name: &Ident,
        args: &'p [Expr],
    ) -> EvalResult<Value> {
        let Some(Binding::Method(sig)) = self.binding(id) else {
            return Err(RuntimeError::Internal(format!(
                "unbound call to '{}'",
                name.name
            )));
        };

        let recv_value = match recv {
            Some(receiver) => Some(self.eval_expr(receiver)?),
            None => None,
        };
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(arg)?);
        }
        // Dispatch through null fails after the operands are evaluated.
        if matches!(recv_value, Some(Value::Null)) {
            return Err(RuntimeError::NullReference(format!(
                "cannot call method '{}' on null",
                name.name
            )));
        }

        match sig.kind {
            MethodKind::Builtin(builtin) => self.exec_builtin(builtin, recv_value, arg_values),
            MethodKind::User(method) => {
                let this = match recv_value {
                    Some(value) => Some(value),
                    None => self.frame()?.this.clone(),
                };
                self.call_user_method(method, this, arg_values)
            }
        }
    }

    fn eval_new(&mut self, id: NodeId) -> EvalResult<Value> {
        match self.binding(id) {
            Some(Binding::NewObject { class }) => self.construct_object(class),
            Some(Binding::NewConsole) => Ok(Value::Console),
            _ => Err(RuntimeError::Internal("unbound 'new' expression".to_string())),
        }
    }

    /// Allocate a zero-initialized instance, then run the class's field
    /// initializers with `this` bound to the new object, in declaration
    /// order.
    fn construct_object(&mut self, class: &str) -> EvalResult<Value> {
        let analysis = self.analysis;
        let Some(entry) = analysis.table.class(class) else {
            return Err(RuntimeError::Internal(format!("unknown class '{class}'")));
        };
        let mut fields = BTreeMap::new();
        for field in &entry.fields {
            fields.insert(field.name.clone(), Value::zero_of(&field.ty));
        }
        let handle = self.heap.alloc_object(fields);
        let value = Value::Object(handle);

        if let Some((ns_idx, class_idx)) = entry.decl {
            let program = self.program;
            let class_decl = &program.namespaces[ns_idx].classes[class_idx];
            for field in &class_decl.fields {
                let Some(init) = &field.init else { continue };
                self.guard_depth()?;
                self.frames.push(Frame {
                    env: Environment::new(),
                    this: Some(value.clone()),
                });
                let outcome = self.eval_expr(init);
                self.frames.pop();
                let init_value = outcome?;
                self.heap
                    .object_mut(handle)
                    .fields
                    .insert(field.name.name.clone(), init_value);
            }
        }
        Ok(value)
    }

    fn eval_new_array(&mut self, id: NodeId, len: &'p Expr) -> EvalResult<Value> {
        let Some(Binding::NewArray { elem }) = self.binding(id) else {
            return Err(RuntimeError::Internal(
                "unbound array allocation".to_string(),
            ));
        };
        let len = as_int(self.eval_expr(len)?)?;
        if len < 0 {
            return Err(RuntimeError::NegativeArrayLength(len));
        }
        let handle = self.heap.alloc_array(len as usize, Value::zero_of(elem));
        Ok(Value::Array(handle))
    }

    fn eval_unary(&mut self, id: NodeId, operand: &'p Expr) -> EvalResult<Value> {
        let Some(Binding::Operator(sig)) = self.binding(id) else {
            return Err(RuntimeError::Internal("unbound unary operator".to_string()));
        };
        let value = self.eval_expr(operand)?;
        match sig.kind {
            OperatorKind::Builtin(BuiltinOp::IntNeg) => Ok(Value::Int(as_int(value)?.wrapping_neg())),
            OperatorKind::Builtin(BuiltinOp::BoolNot) => Ok(Value::Bool(!as_bool(value)?)),
            _ => Err(RuntimeError::Internal(format!(
                "operator '{}' is not a unary operator",
                sig.symbol
            ))),
        }
    }

    fn eval_binary(&mut self, id: NodeId, lhs: &'p Expr, rhs: &'p Expr) -> EvalResult<Value> {
        let Some(Binding::Operator(sig)) = self.binding(id) else {
            return Err(RuntimeError::Internal("unbound binary operator".to_string()));
        };
        match sig.kind {
            // Logical operators short-circuit: the right operand is only
            // evaluated when the left one does not decide the result.
            OperatorKind::Builtin(BuiltinOp::BoolAnd) => {
                if !as_bool(self.eval_expr(lhs)?)? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(as_bool(self.eval_expr(rhs)?)?))
            }
            OperatorKind::Builtin(BuiltinOp::BoolOr) => {
                if as_bool(self.eval_expr(lhs)?)? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(as_bool(self.eval_expr(rhs)?)?))
            }
            OperatorKind::Builtin(op) => {
                let left = self.eval_expr(lhs)?;
                let right = self.eval_expr(rhs)?;
                apply_binary_builtin(op, left, right)
            }
            OperatorKind::User(operator) => {
                let left = self.eval_expr(lhs)?;
                let right = self.eval_expr(rhs)?;
                self.call_operator(operator, vec![left, right])
            }
        }
    }

    fn eval_assign(&mut self, target: &'p Expr, value: &'p Expr) -> EvalResult<Value> {
        match &target.kind {
            ExprKind::Ident(name) => {
                let new_value = self.eval_expr(value)?;
                if matches!(self.binding(target.id), Some(Binding::ImplicitField)) {
                    let this = self.current_this()?;
                    self.heap
                        .object_mut(this)
                        .fields
                        .insert(name.clone(), new_value.clone());
                } else if !self.frame_mut()?.env.set(name, new_value.clone()) {
                    return Err(RuntimeError::Internal(format!("unknown local '{name}'")));
                }
                Ok(new_value)
            }
            ExprKind::Field { recv, name } => {
                let recv_value = self.eval_expr(recv)?;
                let new_value = self.eval_expr(value)?;
                match recv_value {
                    Value::Object(handle) => {
                        self.heap
                            .object_mut(handle)
                            .fields
                            .insert(name.name.clone(), new_value.clone());
                        Ok(new_value)
                    }
                    Value::Null => Err(RuntimeError::NullReference(format!(
                        "cannot assign field '{}' of null",
                        name.name
                    ))),
                    other => Err(internal_operand("object", &other)),
                }
            }
            ExprKind::Index { recv, index } => {
                let recv_value = self.eval_expr(recv)?;
                let idx = as_int(self.eval_expr(index)?)?;
                let new_value = self.eval_expr(value)?;
                match recv_value {
                    Value::Array(handle) => {
                        let len = self.heap.array(handle).items.len();
                        if idx < 0 || idx as usize >= len {
                            return Err(RuntimeError::IndexOutOfRange { index: idx, len });
                        }
                        self.heap.array_mut(handle).items[idx as usize] = new_value.clone();
                        Ok(new_value)
                    }
                    Value::Null => Err(RuntimeError::NullReference(
                        "cannot assign into a null array".to_string(),
                    )),
                    other => Err(internal_operand("array", &other)),
                }
            }
            _ => Err(RuntimeError::Internal(
                "invalid assignment target".to_string(),
            )),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Built-ins
    // ══════════════════════════════════════════════════════════════════════

    fn exec_builtin(
        &mut self,
        builtin: BuiltinMethod,
        recv: Option<Value>,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        match builtin {
            BuiltinMethod::ConsoleWrite => {
                let text = args.first().map(Value::to_string).unwrap_or_default();
                self.console.write(&text);
                Ok(Value::Void)
            }
            BuiltinMethod::ConsoleWriteLine => {
                let text = args.first().map(Value::to_string).unwrap_or_default();
                self.console.write_line(&text);
                Ok(Value::Void)
            }
            BuiltinMethod::ConsoleReadInt => self.console.read_int().map(Value::Int),

            BuiltinMethod::StringIndexOfChar => {
                let text = as_str(required(recv)?)?;
                let needle = as_char(first_arg(args)?)?;
                let at = text
                    .chars()
                    .position(|c| c == needle)
                    .map(|i| i as i32)
                    .unwrap_or(-1);
                Ok(Value::Int(at))
            }
            BuiltinMethod::StringIndexOfString => {
                let text = as_str(required(recv)?)?;
                let needle = as_str(first_arg(args)?)?;
                Ok(Value::Int(index_of(&text, &needle)))
            }
            BuiltinMethod::StringSubstring => {
                let text = as_str(required(recv)?)?;
                let start = as_int(first_arg(args)?)?;
                let len = text.chars().count();
                // `start == len` is valid and yields the empty suffix.
                if start < 0 || start as usize > len {
                    return Err(RuntimeError::IndexOutOfRange { index: start, len });
                }
                Ok(Value::Str(text.chars().skip(start as usize).collect()))
            }
            BuiltinMethod::StringCharAt => {
                let text = as_str(required(recv)?)?;
                let index = as_int(first_arg(args)?)?;
                let len = text.chars().count();
                if index < 0 || index as usize >= len {
                    return Err(RuntimeError::IndexOutOfRange { index, len });
                }
                match text.chars().nth(index as usize) {
                    Some(c) => Ok(Value::Char(c)),
                    None => Err(RuntimeError::Internal("char index vanished".to_string())),
                }
            }
            BuiltinMethod::StringEquals => {
                let text = as_str(required(recv)?)?;
                let other = as_str(first_arg(args)?)?;
                Ok(Value::Bool(text == other))
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Free helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Map a finished body to its call result: falling off the end of a void
/// body yields `Void`; `return` carries the value out.
fn finish_call(outcome: EvalResult<()>) -> EvalResult<Value> {
    match outcome {
        Ok(()) => Ok(Value::Void),
        Err(RuntimeError::Return(value)) => Ok(value),
        Err(err) => Err(err),
    }
}

/// The zero value for an uninitialized local, straight from its syntactic
/// annotation (reference-typed and inferred slots zero to `null`; `var`
/// without an initializer never passes the checker).
fn zero_from_annotation(ann: &TypeAnnotation) -> Value {
    match &ann.kind {
        TypeKind::Int => Value::Int(0),
        TypeKind::Bool => Value::Bool(false),
        TypeKind::Char => Value::Char('\0'),
        TypeKind::String => Value::Str(String::new()),
        _ => Value::Null,
    }
}

/// Char-indexed substring search; the not-found sentinel is `-1`.
fn index_of(hay: &str, needle: &str) -> i32 {
    let hay: Vec<char> = hay.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return 0;
    }
    if needle.len() > hay.len() {
        return -1;
    }
    for start in 0..=(hay.len() - needle.len()) {
        if hay[start..start + needle.len()] == needle[..] {
            return start as i32;
        }
    }
    -1
}

fn apply_binary_builtin(op: BuiltinOp, left: Value, right: Value) -> EvalResult<Value> {
    use BuiltinOp::*;
    match op {
        IntAdd => Ok(Value::Int(as_int(left)?.wrapping_add(as_int(right)?))),
        IntSub => Ok(Value::Int(as_int(left)?.wrapping_sub(as_int(right)?))),
        IntMul => Ok(Value::Int(as_int(left)?.wrapping_mul(as_int(right)?))),
        IntDiv => {
            let divisor = as_int(right)?;
            if divisor == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Int(as_int(left)?.wrapping_div(divisor)))
        }
        IntRem => {
            let divisor = as_int(right)?;
            if divisor == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Int(as_int(left)?.wrapping_rem(divisor)))
        }
        IntLt => Ok(Value::Bool(as_int(left)? < as_int(right)?)),
        IntGt => Ok(Value::Bool(as_int(left)? > as_int(right)?)),
        IntLe => Ok(Value::Bool(as_int(left)? <= as_int(right)?)),
        IntGe => Ok(Value::Bool(as_int(left)? >= as_int(right)?)),
        IntEq => Ok(Value::Bool(as_int(left)? == as_int(right)?)),
        IntNe => Ok(Value::Bool(as_int(left)? != as_int(right)?)),

        BoolEq => Ok(Value::Bool(as_bool(left)? == as_bool(right)?)),
        BoolNe => Ok(Value::Bool(as_bool(left)? != as_bool(right)?)),

        CharEq => Ok(Value::Bool(as_char(left)? == as_char(right)?)),
        CharNe => Ok(Value::Bool(as_char(left)? != as_char(right)?)),
        CharLt => Ok(Value::Bool(as_char(left)? < as_char(right)?)),
        CharGt => Ok(Value::Bool(as_char(left)? > as_char(right)?)),
        CharLe => Ok(Value::Bool(as_char(left)? <= as_char(right)?)),
        CharGe => Ok(Value::Bool(as_char(left)? >= as_char(right)?)),

        StrConcat => {
            let mut text = as_str(left)?;
            text.push_str(&as_str(right)?);
            Ok(Value::Str(text))
        }
        StrEq => Ok(Value::Bool(as_str(left)? == as_str(right)?)),
        StrNe => Ok(Value::Bool(as_str(left)? != as_str(right)?)),

        RefEq => Ok(Value::Bool(ref_eq(&left, &right)?)),
        RefNe => Ok(Value::Bool(!ref_eq(&left, &right)?)),

        BoolAnd | BoolOr | BoolNot | IntNeg => Err(RuntimeError::Internal(format!(
            "operator {op:?} is not a plain binary operator"
        ))),
    }
}

/// Reference identity: two handles are equal iff they name the same heap
/// instance; `null` equals only `null`.
fn ref_eq(left: &Value, right: &Value) -> EvalResult<bool> {
    match (left, right) {
        (Value::Object(a), Value::Object(b)) => Ok(a == b),
        (Value::Array(a), Value::Array(b)) => Ok(a == b),
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, _) | (_, Value::Null) => Ok(false),
        (Value::Console, Value::Console) => Ok(true),
        _ => Err(RuntimeError::Internal(format!(
            "cannot compare {} and {} by identity",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn required(recv: Option<Value>) -> EvalResult<Value> {
    recv.ok_or_else(|| RuntimeError::Internal("built-in call lost its receiver".to_string()))
}

fn first_arg(args: Vec<Value>) -> EvalResult<Value> {
    args.into_iter()
        .next()
        .ok_or_else(|| RuntimeError::Internal("built-in call lost its argument".to_string()))
}

fn as_int(value: Value) -> EvalResult<i32> {
    match value {
        Value::Int(v) => Ok(v),
        other => Err(internal_operand("int", &other)),
    }
}

fn as_bool(value: Value) -> EvalResult<bool> {
    match value {
        Value::Bool(v) => Ok(v),
        other => Err(internal_operand("bool", &other)),
    }
}

fn as_char(value: Value) -> EvalResult<char> {
    match value {
        Value::Char(v) => Ok(v),
        other => Err(internal_operand("char", &other)),
    }
}

fn as_str(value: Value) -> EvalResult<String> {
    match value {
        Value::Str(v) => Ok(v),
        other => Err(internal_operand("string", &other)),
    }
}

fn internal_operand(expected: &str, got: &Value) -> RuntimeError {
    RuntimeError::Internal(format!(
        "expected a {expected} value, got {}",
        got.type_name()
    ))
}
