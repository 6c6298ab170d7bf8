//! Tree-walking interpreter.
//!
//! A [`Context`] owns the builtin namespace and the output sink. Each call to
//! [`Context::run_code`] creates a short-lived [`Interpreter`] that executes
//! one [`Code`](crate::Code) unit against a caller-owned global namespace, so
//! the globals persist between prompt turns while the interpreter does not.

mod builtins;
mod context;
mod frame;
mod ops;
#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::rc::Rc;

use adder_foundation::Namespace;

use crate::ast::{BinOp, BoolOp, ExceptHandler, Expr, ExprKind, FunctionDef, Stmt, StmtKind};
use crate::compiler::{CompileMode, compile};
use crate::exception::{ExceptionObject, ExceptionType, RuntimeError, TraceFrame};
use crate::value::{Args, BoundMethod, Exec, Function, Value};

pub use context::{Context, ContextOptions, DEFAULT_RECURSION_LIMIT, Module, Output};
pub use frame::Frame;

/// Control flow out of a statement.
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Traceback bookkeeping for one active call.
struct CallSite {
    name: String,
    line: u32,
}

/// Executes one code unit.
///
/// Builtin functions receive the interpreter so they can call back into user
/// code (`sorted(key=...)`, `map`) and write output.
pub struct Interpreter<'a> {
    builtins: &'a Namespace<Value>,
    globals: &'a mut Namespace<Value>,
    output: &'a Output,
    filename: String,
    interactive: bool,
    recursion_limit: usize,
    /// The innermost function frame; `None` at module level.
    scope: Option<Rc<Frame>>,
    calls: Vec<CallSite>,
    /// Exceptions being handled by enclosing `except` blocks.
    handling: Vec<Rc<ExceptionObject>>,
    last_value: Option<Value>,
}

impl<'a> Interpreter<'a> {
    fn new(
        context: &'a Context,
        globals: &'a mut Namespace<Value>,
        filename: &str,
        interactive: bool,
    ) -> Self {
        Self {
            builtins: context.builtins(),
            globals,
            output: context.output(),
            filename: filename.to_string(),
            interactive,
            recursion_limit: context.recursion_limit(),
            scope: None,
            calls: Vec::new(),
            handling: Vec::new(),
            last_value: None,
        }
    }

    /// Runs top-level statements, returning the last echoed value.
    fn run_module(&mut self, body: &[Stmt]) -> Exec<Value> {
        self.calls.push(CallSite {
            name: "<module>".to_string(),
            line: body.first().map_or(1, |s| s.span.line),
        });
        let result = self.exec_block(body);
        let site = self.calls.pop();
        match result {
            Ok(_) => Ok(self.last_value.take().unwrap_or(Value::None)),
            Err(err) => Err(self.unwind(err, site)),
        }
    }

    /// Records a frame in the traceback as an exception leaves it.
    fn unwind(&self, mut err: RuntimeError, site: Option<CallSite>) -> RuntimeError {
        if let Some(site) = site {
            err.traceback.insert(
                0,
                TraceFrame {
                    filename: self.filename.clone(),
                    line: site.line,
                    name: site.name,
                },
            );
        }
        err
    }

    // =========================================================================
    // Services for builtins
    // =========================================================================

    /// Writes text to the output sink.
    ///
    /// # Errors
    ///
    /// Returns a `RuntimeError` exception if the sink fails.
    pub fn write(&self, text: &str) -> Exec<()> {
        self.output.write(text)
    }

    /// Calls any callable value.
    ///
    /// # Errors
    ///
    /// Returns whatever the callee raises, or a `TypeError` if `callee` is not
    /// callable.
    pub fn call(&mut self, callee: &Value, args: Args) -> Exec<Value> {
        match callee {
            Value::Function(func) => self.call_function(func, args),
            Value::Builtin(builtin) => (builtin.func)(self, args),
            Value::Method(method) => (method.func)(self, &method.receiver, args),
            Value::Type(ty) => builtins::construct(self, *ty, args),
            Value::ExceptionType(kind) => {
                args.check_keywords(kind.name(), &[])?;
                Ok(Value::Exception(Rc::new(ExceptionObject {
                    kind: *kind,
                    args: args.positional,
                })))
            }
            _ => Err(RuntimeError::type_error(format!(
                "'{}' object is not callable",
                callee.type_name()
            ))),
        }
    }

    /// Returns the names visible to `dir()` without arguments, sorted.
    #[must_use]
    pub fn visible_names(&self) -> Vec<String> {
        let mut names = match &self.scope {
            Some(frame) => frame.names(),
            None => self.globals.names().map(str::to_string).collect(),
        };
        names.sort();
        names
    }

    /// Compiles and runs `source` against the module globals, as `exec` does.
    ///
    /// # Errors
    ///
    /// Compile failures are raised as `SyntaxError` exceptions; runtime
    /// failures propagate unchanged.
    pub fn exec_source(&mut self, source: &str) -> Exec<Value> {
        let code = compile(source, "<string>", CompileMode::Exec, false).map_err(|e| {
            RuntimeError::new(ExceptionType::SyntaxError, format!("{} (<string>, line {})", e.message, e.line))
        })?;
        let scope = self.scope.take();
        let interactive = std::mem::replace(&mut self.interactive, false);
        let result = self.exec_block(&code.body);
        self.scope = scope;
        self.interactive = interactive;
        result.map(|_| Value::None)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn make_function(&mut self, def: &Rc<FunctionDef>) -> Exec<Value> {
        let mut defaults = Vec::new();
        for param in &def.params {
            if let Some(default) = &param.default {
                defaults.push(self.eval(default)?);
            }
        }
        Ok(Value::Function(Rc::new(Function {
            def: Rc::clone(def),
            defaults,
            enclosing: self.scope.clone(),
        })))
    }

    fn call_function(&mut self, func: &Rc<Function>, args: Args) -> Exec<Value> {
        if self.calls.len() > self.recursion_limit {
            return Err(RuntimeError::new(
                ExceptionType::RecursionError,
                "maximum recursion depth exceeded",
            ));
        }
        let locals = bind_arguments(func, args)?;
        let frame = Frame::new(Rc::clone(&func.def), locals, func.enclosing.clone());
        let saved = self.scope.replace(Rc::new(frame));
        self.calls.push(CallSite {
            name: func.def.name.clone(),
            line: func.def.span.line,
        });

        let result = self.exec_block(&func.def.body);

        let site = self.calls.pop();
        self.scope = saved;
        match result {
            Ok(Flow::Return(value)) => Ok(value),
            Ok(_) => Ok(Value::None),
            Err(err) => Err(self.unwind(err, site)),
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    fn load_name(&self, name: &str) -> Exec<Value> {
        if let Some(frame) = &self.scope {
            if frame.is_local(name) {
                return frame.get(name).ok_or_else(|| {
                    RuntimeError::new(
                        ExceptionType::UnboundLocalError,
                        format!("local variable '{name}' referenced before assignment"),
                    )
                });
            }
            if !frame.is_global(name) {
                let mut parent = frame.parent();
                while let Some(outer) = parent {
                    if outer.is_local(name) {
                        return outer.get(name).ok_or_else(|| {
                            RuntimeError::new(
                                ExceptionType::NameError,
                                format!(
                                    "free variable '{name}' referenced before assignment in enclosing scope"
                                ),
                            )
                        });
                    }
                    parent = outer.parent();
                }
            }
        }
        self.globals
            .get(name)
            .or_else(|| self.builtins.get(name))
            .cloned()
            .ok_or_else(|| RuntimeError::name_error(name))
    }

    fn store_name(&mut self, name: &str, value: Value) {
        match &self.scope {
            Some(frame) if frame.is_local(name) => frame.set(name, value),
            _ => {
                self.globals.insert(name, value);
            }
        }
    }

    fn delete_name(&mut self, name: &str) -> Exec<()> {
        let removed = match &self.scope {
            Some(frame) if frame.is_local(name) => frame.remove(name),
            _ => self.globals.remove(name).is_some(),
        };
        if removed {
            Ok(())
        } else {
            Err(RuntimeError::name_error(name))
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn exec_block(&mut self, body: &[Stmt]) -> Exec<Flow> {
        for stmt in body {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Exec<Flow> {
        if let Some(site) = self.calls.last_mut() {
            site.line = stmt.span.line;
        }

        match &stmt.kind {
            StmtKind::Expr(expr) => {
                let value = self.eval(expr)?;
                if self.interactive && self.scope.is_none() && !matches!(value, Value::None) {
                    self.write(&format!("{}\n", value.repr()))?;
                    self.last_value = Some(value);
                }
            }
            StmtKind::Assign { targets, value } => {
                let value = self.eval(value)?;
                for target in targets {
                    self.assign(target, value.clone())?;
                }
            }
            StmtKind::AugAssign { target, op, value } => self.aug_assign(target, *op, value)?,
            StmtKind::Pass | StmtKind::Global(_) => {}
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::If { test, body, orelse } => {
                let branch = if self.eval(test)?.is_truthy() { body } else { orelse };
                return self.exec_block(branch);
            }
            StmtKind::While { test, body, orelse } => {
                while self.eval(test)?.is_truthy() {
                    match self.exec_block(body)? {
                        Flow::Break => return Ok(Flow::Normal),
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                return self.exec_block(orelse);
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => {
                let iterable = self.eval(iter)?;
                for item in ops::iterate(&iterable)? {
                    self.assign(target, item)?;
                    match self.exec_block(body)? {
                        Flow::Break => return Ok(Flow::Normal),
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                return self.exec_block(orelse);
            }
            StmtKind::FunctionDef(def) => {
                let function = self.make_function(def)?;
                self.store_name(&def.name, function);
            }
            StmtKind::Del(targets) => {
                for target in targets {
                    self.delete(target)?;
                }
            }
            StmtKind::Raise(value) => return Err(self.raise(value.as_ref())?),
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => return self.exec_try(body, handlers, orelse, finalbody),
            StmtKind::Assert { test, msg } => {
                if !self.eval(test)?.is_truthy() {
                    let args = match msg {
                        Some(msg) => vec![self.eval(msg)?],
                        None => Vec::new(),
                    };
                    return Err(RuntimeError::raise(Rc::new(ExceptionObject {
                        kind: ExceptionType::AssertionError,
                        args,
                    })));
                }
            }
            StmtKind::Import { module, .. } => {
                return Err(RuntimeError::new(
                    ExceptionType::ImportError,
                    format!("No module named '{module}'"),
                ));
            }
        }
        Ok(Flow::Normal)
    }

    /// Builds the error a `raise` statement propagates.
    fn raise(&mut self, value: Option<&Expr>) -> Exec<RuntimeError> {
        let Some(expr) = value else {
            return Ok(match self.handling.last() {
                Some(exception) => RuntimeError::raise(Rc::clone(exception)),
                None => RuntimeError::new(
                    ExceptionType::RuntimeError,
                    "No active exception to reraise",
                ),
            });
        };
        Ok(match self.eval(expr)? {
            Value::ExceptionType(kind) => RuntimeError::raise(Rc::new(ExceptionObject {
                kind,
                args: Vec::new(),
            })),
            Value::Exception(exception) => RuntimeError::raise(exception),
            _ => RuntimeError::type_error("exceptions must derive from BaseException"),
        })
    }

    fn exec_try(
        &mut self,
        body: &[Stmt],
        handlers: &[ExceptHandler],
        orelse: &[Stmt],
        finalbody: &[Stmt],
    ) -> Exec<Flow> {
        let result = match self.exec_block(body) {
            Ok(Flow::Normal) => self.exec_block(orelse),
            Ok(flow) => Ok(flow),
            Err(err) => self.handle(err, handlers),
        };
        if finalbody.is_empty() {
            return result;
        }
        match self.exec_block(finalbody)? {
            Flow::Normal => result,
            flow => Ok(flow),
        }
    }

    /// Runs the first handler matching `err`, or re-raises it.
    fn handle(&mut self, err: RuntimeError, handlers: &[ExceptHandler]) -> Exec<Flow> {
        for handler in handlers {
            if let Some(kind) = &handler.kind {
                let class = self.eval(kind)?;
                if !exception_matches(&class, &err.exception)? {
                    continue;
                }
            }
            if let Some(name) = &handler.name {
                self.store_name(name, Value::Exception(Rc::clone(&err.exception)));
            }
            self.handling.push(Rc::clone(&err.exception));
            let result = self.exec_block(&handler.body);
            self.handling.pop();
            if let Some(name) = &handler.name {
                let _ = self.delete_name(name);
            }
            return result;
        }
        Err(err)
    }

    fn assign(&mut self, target: &Expr, value: Value) -> Exec<()> {
        match &target.kind {
            ExprKind::Name(name) => {
                self.store_name(name, value);
                Ok(())
            }
            ExprKind::Tuple(targets) | ExprKind::List(targets) => {
                let items = ops::collect(&value)?;
                if items.len() > targets.len() {
                    return Err(RuntimeError::value_error(format!(
                        "too many values to unpack (expected {})",
                        targets.len()
                    )));
                }
                if items.len() < targets.len() {
                    return Err(RuntimeError::value_error(format!(
                        "not enough values to unpack (expected {}, got {})",
                        targets.len(),
                        items.len()
                    )));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.assign(target, item)?;
                }
                Ok(())
            }
            ExprKind::Subscript { value: container, index } => {
                let container = self.eval(container)?;
                if matches!(index.kind, ExprKind::Slice { .. }) {
                    return Err(RuntimeError::type_error("slice assignment is not supported"));
                }
                let key = self.eval(index)?;
                ops::set_item(&container, key, value)
            }
            ExprKind::Attribute { value: object, attr } => {
                let object = self.eval(object)?;
                Err(RuntimeError::attribute_error(&object, attr))
            }
            _ => Err(RuntimeError::type_error(format!(
                "cannot assign to {}",
                target.describe()
            ))),
        }
    }

    fn aug_assign(&mut self, target: &Expr, op: BinOp, value: &Expr) -> Exec<()> {
        match &target.kind {
            ExprKind::Name(name) => {
                let current = self.load_name(name)?;
                let rhs = self.eval(value)?;
                let result = augmented(op, current, &rhs)?;
                self.store_name(name, result);
                Ok(())
            }
            ExprKind::Subscript { value: container, index } => {
                let container = self.eval(container)?;
                if matches!(index.kind, ExprKind::Slice { .. }) {
                    return Err(RuntimeError::type_error("slice assignment is not supported"));
                }
                let key = self.eval(index)?;
                let current = ops::get_item(&container, &key)?;
                let rhs = self.eval(value)?;
                let result = augmented(op, current, &rhs)?;
                ops::set_item(&container, key, result)
            }
            _ => {
                let object = self.eval(target)?;
                let ExprKind::Attribute { attr, .. } = &target.kind else {
                    return Err(RuntimeError::type_error("illegal expression for augmented assignment"));
                };
                Err(RuntimeError::attribute_error(&object, attr))
            }
        }
    }

    fn delete(&mut self, target: &Expr) -> Exec<()> {
        match &target.kind {
            ExprKind::Name(name) => self.delete_name(name),
            ExprKind::Tuple(targets) | ExprKind::List(targets) => {
                for target in targets {
                    self.delete(target)?;
                }
                Ok(())
            }
            ExprKind::Subscript { value, index } => {
                let container = self.eval(value)?;
                let key = self.eval(index)?;
                ops::del_item(&container, &key)
            }
            ExprKind::Attribute { value, attr } => {
                let object = self.eval(value)?;
                Err(RuntimeError::attribute_error(&object, attr))
            }
            _ => Err(RuntimeError::type_error(format!(
                "cannot delete {}",
                target.describe()
            ))),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn eval(&mut self, expr: &Expr) -> Exec<Value> {
        match &expr.kind {
            ExprKind::None => Ok(Value::None),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(i) => Ok(Value::Int(*i)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(s) => Ok(Value::Str(Rc::clone(s))),
            ExprKind::Name(name) => self.load_name(name),
            ExprKind::List(items) => Ok(Value::list(self.eval_all(items)?)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_all(items)?)),
            ExprKind::Dict(pairs) => {
                let mut dict = crate::value::Dict::new();
                for (key, value) in pairs {
                    let key = self.eval(key)?;
                    let value = self.eval(value)?;
                    dict.insert(key, value)?;
                }
                Ok(Value::dict(dict))
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                ops::unary(*op, &operand)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                ops::binary(*op, &left, &right)
            }
            ExprKind::BoolOp { op, left, right } => {
                let left = self.eval(left)?;
                let short_circuit = match op {
                    BoolOp::And => !left.is_truthy(),
                    BoolOp::Or => left.is_truthy(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            ExprKind::Compare { left, ops: comparisons } => {
                let mut left = self.eval(left)?;
                for (op, right) in comparisons {
                    let right = self.eval(right)?;
                    if !ops::compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            ExprKind::IfExp { test, body, orelse } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(body)
                } else {
                    self.eval(orelse)
                }
            }
            ExprKind::Lambda(def) => self.make_function(def),
            ExprKind::Call {
                func,
                args,
                keywords,
            } => {
                let callee = self.eval(func)?;
                let mut call_args = Args::positional(self.eval_all(args)?);
                for (name, value) in keywords {
                    let value = self.eval(value)?;
                    call_args.keywords.push((name.clone(), value));
                }
                self.call(&callee, call_args)
            }
            ExprKind::Attribute { value, attr } => {
                let object = self.eval(value)?;
                get_attribute(object, attr)
            }
            ExprKind::Subscript { value, index } => {
                let container = self.eval(value)?;
                if let ExprKind::Slice { lower, upper, step } = &index.kind {
                    let lower = self.eval_bound(lower.as_deref())?;
                    let upper = self.eval_bound(upper.as_deref())?;
                    let step = self.eval_bound(step.as_deref())?;
                    return ops::get_slice(&container, lower, upper, step);
                }
                let key = self.eval(index)?;
                ops::get_item(&container, &key)
            }
            ExprKind::Slice { .. } => Err(RuntimeError::type_error(
                "slice expressions are only valid inside subscripts",
            )),
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Exec<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    /// Evaluates an optional slice bound (`None` or an integer).
    fn eval_bound(&mut self, bound: Option<&Expr>) -> Exec<Option<i64>> {
        let Some(expr) = bound else {
            return Ok(None);
        };
        match self.eval(expr)? {
            Value::None => Ok(None),
            value => value.as_int().map(Some).ok_or_else(|| {
                RuntimeError::type_error(
                    "slice indices must be integers or None or have an __index__ method",
                )
            }),
        }
    }
}

/// Binds call arguments to parameter names.
fn bind_arguments(func: &Function, args: Args) -> Exec<HashMap<String, Value>> {
    let def = &func.def;
    let name = &def.name;
    let params = &def.params;

    if args.positional.len() > params.len() {
        let expected = params.len();
        let required = expected - func.defaults.len();
        let given = args.positional.len();
        let takes = if required == expected {
            expected.to_string()
        } else {
            format!("from {required} to {expected}")
        };
        return Err(RuntimeError::type_error(format!(
            "{name}() takes {takes} positional argument{} but {given} {} given",
            if expected == 1 { "" } else { "s" },
            if given == 1 { "was" } else { "were" }
        )));
    }

    let mut slots: Vec<Option<Value>> = vec![None; params.len()];
    for (slot, value) in slots.iter_mut().zip(args.positional) {
        *slot = Some(value);
    }
    for (key, value) in args.keywords {
        let Some(i) = params.iter().position(|p| p.name == key) else {
            return Err(RuntimeError::type_error(format!(
                "{name}() got an unexpected keyword argument '{key}'"
            )));
        };
        if slots[i].is_some() {
            return Err(RuntimeError::type_error(format!(
                "{name}() got multiple values for argument '{key}'"
            )));
        }
        slots[i] = Some(value);
    }

    let first_default = params.len() - func.defaults.len();
    let mut locals = HashMap::with_capacity(params.len());
    let mut missing = Vec::new();
    for (i, (param, slot)) in params.iter().zip(slots).enumerate() {
        let value = match slot {
            Some(value) => value,
            None if i >= first_default => func.defaults[i - first_default].clone(),
            None => {
                missing.push(format!("'{}'", param.name));
                continue;
            }
        };
        locals.insert(param.name.clone(), value);
    }

    if !missing.is_empty() {
        let count = missing.len();
        let list = match missing.as_slice() {
            [one] => one.clone(),
            [init @ .., last] if count == 2 => format!("{} and {last}", init.join(", ")),
            [init @ .., last] => format!("{}, and {last}", init.join(", ")),
            [] => String::new(),
        };
        return Err(RuntimeError::type_error(format!(
            "{name}() missing {count} required positional argument{}: {list}",
            if count == 1 { "" } else { "s" }
        )));
    }
    Ok(locals)
}

/// Applies an augmented operator; `+=` on a list extends it in place.
fn augmented(op: BinOp, current: Value, rhs: &Value) -> Exec<Value> {
    if let (BinOp::Add, Value::List(items)) = (op, &current) {
        let extra = ops::collect(rhs)?;
        items.borrow_mut().extend(extra);
        return Ok(current);
    }
    ops::binary(op, &current, rhs)
}

/// Tests an `except` clause against a raised exception.
fn exception_matches(class: &Value, exception: &ExceptionObject) -> Exec<bool> {
    match class {
        Value::ExceptionType(kind) => Ok(exception.kind.is_subclass_of(*kind)),
        Value::Tuple(classes) => {
            for class in classes.iter() {
                if exception_matches(class, exception)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(RuntimeError::type_error(
            "catching classes that do not inherit from BaseException is not allowed",
        )),
    }
}

/// `object.attr`: bound builtin methods and exception `args`.
fn get_attribute(object: Value, attr: &str) -> Exec<Value> {
    if let Value::Exception(exception) = &object {
        if attr == "args" {
            return Ok(Value::tuple(exception.args.clone()));
        }
    }
    match builtins::lookup_method(&object, attr) {
        Some((name, func)) => Ok(Value::Method(Rc::new(BoundMethod {
            receiver: object,
            name,
            func,
        }))),
        None => Err(RuntimeError::attribute_error(&object, attr)),
    }
}
