//! The tree-walking evaluator, grounded on `original_source/src/evaluator.cpp`
//! for the pieces it actually has (literal dispatch, function-table
//! registration, native-before-user-function call priority, the
//! context-string read/assign/reassign split on `Variable`) and on
//! `spec.md` §4.5's fuller description for everything that source never
//! implemented (`if`/`while`/`for`, `break`/`continue`/`return`, classes).
//!
//! Control flow that unwinds a single statement list (`break`/`continue`)
//! is a structural property of [`glint_par::ExpressionStmt`], not a
//! [`ControlValue`] flag, so it is threaded through evaluation as a
//! separate [`Flow`] rather than folded into `ControlValue`. `return`/`exit`
//! *are* `ControlValue` flags and are carried transparently through `Flow`.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use glint_lex::TokenKind;
use glint_native::NativeRegistry;
use glint_par::{
    BinaryOp, ClassLiteral, ExpressionStmt, ForLiteral, FunctionCall, FunctionLiteral, IfLiteral,
    Node, Program, TypeMarker, UnaryOp, Variable, WhileLiteral,
};
use glint_value::{eval_binary_op, eval_unary_op, ClassInstance, ControlValue, FuncId, Value};

use crate::error::EvalError;

/// The class template registered when a `ClassLiteral` is visited:
/// constructor parameter names plus the method table built from the
/// `FunctionLiteral`s declared in its body.
struct ClassTemplate {
    params: Vec<String>,
    methods: FxHashMap<String, FuncId>,
}

/// One call's local bindings. Parameters land here; `spec.md` §4.5's
/// "search innermost frame, then globals" lookup rule checks this before
/// falling back to [`Evaluator::globals`].
#[derive(Default)]
struct CallFrame {
    locals: FxHashMap<String, Value>,
}

/// The result of evaluating a single `Node`/block of statements. `Break`
/// and `Continue` only ever originate from an [`ExpressionStmt`]'s own
/// flags and are swallowed at the nearest enclosing loop (or, if there is
/// none, at the function/program boundary) per `spec.md` §4.5's "a `break`
/// outside a loop is tolerated as a no-op".
enum Flow {
    Normal(ControlValue),
    Break,
    Continue,
}

/// Short-circuits the current expression when a nested call set `is_exit`
/// (e.g. `1 + exit(0)`), propagating it up through whatever is evaluating
/// the sub-expression instead of discarding the flag.
macro_rules! propagate_exit {
    ($cv:expr) => {{
        let cv = $cv;
        if cv.is_exit {
            return Ok(Flow::Normal(cv));
        }
        cv
    }};
}

pub struct Evaluator<'a> {
    natives: &'a NativeRegistry,
    globals: FxHashMap<String, Value>,
    call_stack: Vec<CallFrame>,
    functions: FxHashMap<FuncId, Rc<FunctionLiteral>>,
    function_names: FxHashMap<String, FuncId>,
    classes: FxHashMap<String, Rc<ClassTemplate>>,
    next_func_id: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(natives: &'a NativeRegistry) -> Self {
        Self {
            natives,
            globals: FxHashMap::default(),
            call_stack: Vec::new(),
            functions: FxHashMap::default(),
            function_names: FxHashMap::default(),
            classes: FxHashMap::default(),
            next_func_id: 0,
        }
    }

    /// Runs every statement in `program`, returning the last non-`NullOp`
    /// result. A loose top-level `break`/`continue`/`return` is tolerated
    /// as a no-op; `exit` still halts immediately and is surfaced to the
    /// caller so it can map `ControlValue::value` to a process exit code.
    pub fn eval_program(&mut self, program: &Program) -> Result<ControlValue, EvalError> {
        match self.eval_block(&program.stmts)? {
            Flow::Normal(cv) => Ok(cv),
            Flow::Break | Flow::Continue => Ok(ControlValue::plain(Value::NullOp)),
        }
    }

    fn register_function(&mut self, f: &FunctionLiteral) -> FuncId {
        let id = FuncId(self.next_func_id);
        self.next_func_id += 1;
        self.functions.insert(id, Rc::new(f.clone()));
        self.function_names.insert(f.name.clone(), id);
        id
    }

    fn read(&self, name: &str) -> Result<Value, EvalError> {
        if let Some(frame) = self.call_stack.last() {
            if let Some(v) = frame.locals.get(name) {
                return Ok(v.clone());
            }
        }
        self.globals
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownIdentifier(name.to_string()))
    }

    /// A brand-new name becomes a global; an existing local (of the
    /// innermost frame) is rebound in place instead, so a function can
    /// mutate its own parameters without leaking the write to the caller.
    fn assign(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.call_stack.last_mut() {
            if frame.locals.contains_key(name) {
                frame.locals.insert(name.to_string(), value);
                return;
            }
        }
        self.globals.insert(name.to_string(), value);
    }

    /// Evaluates a block of statements, honoring each statement's own
    /// `is_break`/`is_continue` flag and stopping early on `return`/`exit`.
    fn eval_block(&mut self, stmts: &[ExpressionStmt]) -> Result<Flow, EvalError> {
        let mut last = ControlValue::plain(Value::NullOp);
        for stmt in stmts {
            if stmt.is_break {
                return Ok(Flow::Break);
            }
            if stmt.is_continue {
                return Ok(Flow::Continue);
            }
            if stmt.no_op {
                continue;
            }
            match self.eval_node(&stmt.expr)? {
                Flow::Break => return Ok(Flow::Break),
                Flow::Continue => return Ok(Flow::Continue),
                Flow::Normal(cv) => {
                    if cv.is_return || cv.is_exit {
                        return Ok(Flow::Normal(cv));
                    }
                    if !cv.is_noop() {
                        last = cv;
                    }
                }
            }
        }
        Ok(Flow::Normal(last))
    }

    /// Evaluates a node that can never itself be a bare `break`/`continue`
    /// marker (only `ExpressionStmt` carries those) and unwraps the `Flow`
    /// it produces, used for sub-expressions like operands and arguments.
    fn eval_value(&mut self, node: &Node) -> Result<ControlValue, EvalError> {
        match self.eval_node(node)? {
            Flow::Normal(cv) => Ok(cv),
            Flow::Break | Flow::Continue => Ok(ControlValue::plain(Value::NullOp)),
        }
    }

    fn eval_node(&mut self, node: &Node) -> Result<Flow, EvalError> {
        match node {
            Node::IntLiteral(v) => Ok(Flow::Normal(ControlValue::plain(Value::Int(*v)))),
            Node::FloatLiteral(v) => Ok(Flow::Normal(ControlValue::plain(Value::Float(*v)))),
            Node::StrLiteral(v) => Ok(Flow::Normal(ControlValue::plain(Value::String(v.clone())))),
            Node::BoolLiteral(v) => Ok(Flow::Normal(ControlValue::plain(Value::Bool(*v)))),
            Node::TypeLiteral(t) => Ok(Flow::Normal(ControlValue::plain(type_marker_value(*t)))),
            Node::VecLiteral(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for e in elems {
                    values.push(propagate_exit!(self.eval_value(e)?).value);
                }
                Ok(Flow::Normal(ControlValue::plain(Value::vec_from(values))))
            }
            Node::Variable(v) => self.eval_variable(v),
            Node::UnaryOp(u) => self.eval_unary(u),
            Node::BinaryOp(b) => self.eval_binary(b),
            Node::IfLiteral(i) => self.eval_if(i),
            Node::WhileLiteral(w) => self.eval_while(w),
            Node::ForLiteral(f) => self.eval_for(f),
            Node::ReturnLiteral(v) => {
                let cv = propagate_exit!(self.eval_value(v)?);
                Ok(Flow::Normal(ControlValue::returned(cv.value)))
            }
            Node::FunctionLiteral(f) => {
                self.register_function(f);
                Ok(Flow::Normal(ControlValue::plain(Value::NullOp)))
            }
            Node::ClassLiteral(c) => {
                self.register_class(c);
                Ok(Flow::Normal(ControlValue::plain(Value::NullOp)))
            }
            Node::FunctionCall(c) => self.eval_call(c),
            Node::Program(_) | Node::ExpressionStmt(_) | Node::NoOp => {
                Ok(Flow::Normal(ControlValue::plain(Value::NullOp)))
            }
        }
    }

    fn eval_variable(&mut self, v: &Variable) -> Result<Flow, EvalError> {
        match &v.value {
            Some(rhs) => {
                let rhs_val = propagate_exit!(self.eval_value(rhs)?);
                self.assign(&v.name, rhs_val.value.clone());
                Ok(Flow::Normal(ControlValue::plain(rhs_val.value)))
            }
            None => Ok(Flow::Normal(ControlValue::plain(self.read(&v.name)?))),
        }
    }

    fn eval_unary(&mut self, u: &UnaryOp) -> Result<Flow, EvalError> {
        if matches!(u.op, TokenKind::Increment | TokenKind::Decrement) {
            let Node::Variable(v) = u.operand.as_ref() else {
                return Err(EvalError::NotAnLvalue);
            };
            if v.value.is_some() {
                return Err(EvalError::NotAnLvalue);
            }
            let current = self.read(&v.name)?;
            let updated = eval_unary_op(&current, u.op)?;
            self.assign(&v.name, updated.clone());
            return Ok(Flow::Normal(ControlValue::plain(updated)));
        }
        let operand = propagate_exit!(self.eval_value(&u.operand)?);
        let result = eval_unary_op(&operand.value, u.op)?;
        Ok(Flow::Normal(ControlValue::plain(result)))
    }

    fn eval_binary(&mut self, b: &BinaryOp) -> Result<Flow, EvalError> {
        if b.op.is_assignment() {
            return self.eval_compound_assign(b);
        }
        if b.op == TokenKind::Dot {
            return self.eval_member(b);
        }
        let left = propagate_exit!(self.eval_value(&b.left)?);
        let right = propagate_exit!(self.eval_value(&b.right)?);
        let result = eval_binary_op(&left.value, &right.value, b.op)?;
        Ok(Flow::Normal(ControlValue::plain(result)))
    }

    fn eval_compound_assign(&mut self, b: &BinaryOp) -> Result<Flow, EvalError> {
        let Node::Variable(v) = b.left.as_ref() else {
            return Err(EvalError::NotAnLvalue);
        };
        let rhs = propagate_exit!(self.eval_value(&b.right)?);
        let result = if b.op == TokenKind::Assign {
            rhs.value
        } else {
            let op = b.op.compound_op().expect("is_assignment implies compound_op unless Assign");
            let current = self.read(&v.name)?;
            eval_binary_op(&current, &rhs.value, op)?
        };
        self.assign(&v.name, result.clone());
        Ok(Flow::Normal(ControlValue::plain(result)))
    }

    /// `obj.field` reads a field off a class instance. The grammar never
    /// produces a `Dot` node as an assignment target (`plain_assign` only
    /// accepts a bare `Variable`), so this is read-only; field mutation
    /// happens only from inside that instance's own methods.
    fn eval_member(&mut self, b: &BinaryOp) -> Result<Flow, EvalError> {
        let Node::Variable(field) = b.right.as_ref() else {
            return Err(EvalError::NotAnLvalue);
        };
        let receiver = propagate_exit!(self.eval_value(&b.left)?);
        let Value::ClassInstance(instance) = &receiver.value else {
            return Err(EvalError::NotAnInstance(receiver.value.type_name()));
        };
        let value = instance
            .borrow()
            .fields
            .get(&field.name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownMember(field.name.clone()))?;
        Ok(Flow::Normal(ControlValue::plain(value)))
    }

    fn eval_if(&mut self, i: &IfLiteral) -> Result<Flow, EvalError> {
        let cond = propagate_exit!(self.eval_value(&i.condition)?);
        if cond.value.is_truthy() {
            self.eval_block(&i.then_stmts)
        } else {
            self.eval_block(&i.else_stmts)
        }
    }

    fn eval_while(&mut self, w: &WhileLiteral) -> Result<Flow, EvalError> {
        loop {
            let cond = propagate_exit!(self.eval_value(&w.condition)?);
            if !cond.value.is_truthy() {
                return Ok(Flow::Normal(ControlValue::plain(Value::NullOp)));
            }
            match self.eval_block(&w.stmts)? {
                Flow::Break => return Ok(Flow::Normal(ControlValue::plain(Value::NullOp))),
                Flow::Continue => continue,
                Flow::Normal(cv) if cv.is_return || cv.is_exit => return Ok(Flow::Normal(cv)),
                Flow::Normal(_) => continue,
            }
        }
    }

    fn eval_for(&mut self, f: &ForLiteral) -> Result<Flow, EvalError> {
        let iter = propagate_exit!(self.eval_value(&f.iter)?);
        let Value::Vec(items) = iter.value else {
            return Err(EvalError::NotIterable(iter.value.type_name()));
        };
        let elems: Vec<Value> = items.borrow().clone();
        for elem in elems {
            self.assign(&f.var, elem);
            match self.eval_block(&f.stmts)? {
                Flow::Break => break,
                Flow::Continue => continue,
                Flow::Normal(cv) if cv.is_return || cv.is_exit => return Ok(Flow::Normal(cv)),
                Flow::Normal(_) => continue,
            }
        }
        Ok(Flow::Normal(ControlValue::plain(Value::NullOp)))
    }

    fn register_class(&mut self, c: &ClassLiteral) -> Rc<ClassTemplate> {
        let mut methods = FxHashMap::default();
        for stmt in &c.stmts {
            if let Node::FunctionLiteral(f) = stmt.expr.as_ref() {
                let id = self.register_function(f);
                methods.insert(f.name.clone(), id);
            }
        }
        let template = Rc::new(ClassTemplate {
            params: c.params.clone(),
            methods,
        });
        self.classes.insert(c.name.clone(), template.clone());
        template
    }

    fn eval_call(&mut self, call: &FunctionCall) -> Result<Flow, EvalError> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let cv = propagate_exit!(self.eval_value(arg)?);
            args.push(cv.value);
        }

        if let Some(native) = self.natives.get(&call.name) {
            return Ok(Flow::Normal(native(&args)));
        }
        if let Some(&func_id) = self.function_names.get(&call.name) {
            let func = self.functions[&func_id].clone();
            return Ok(Flow::Normal(self.call_function(&func, args)?));
        }
        if let Some(template) = self.classes.get(&call.name).cloned() {
            return Ok(Flow::Normal(self.construct_instance(&call.name, &template, args)?));
        }
        Err(EvalError::NotCallable(call.name.clone()))
    }

    fn call_function(
        &mut self,
        func: &FunctionLiteral,
        args: Vec<Value>,
    ) -> Result<ControlValue, EvalError> {
        check_arity(&func.name, func.params.len(), args.len())?;
        let mut frame = CallFrame::default();
        for (param, arg) in func.params.iter().zip(args) {
            frame.locals.insert(param.clone(), arg);
        }
        self.call_stack.push(frame);
        let flow = self.eval_block(&func.stmts);
        self.call_stack.pop();
        let cv = match flow? {
            Flow::Normal(cv) => cv,
            Flow::Break | Flow::Continue => ControlValue::plain(Value::NullOp),
        };
        if cv.is_exit {
            return Ok(cv);
        }
        Ok(ControlValue::plain(cv.value))
    }

    fn construct_instance(
        &mut self,
        name: &str,
        template: &ClassTemplate,
        args: Vec<Value>,
    ) -> Result<ControlValue, EvalError> {
        check_arity(name, template.params.len(), args.len())?;
        let mut instance = ClassInstance::new(name);
        for (param, arg) in template.params.iter().zip(args) {
            instance.fields.insert(param.clone(), arg);
        }
        instance.methods = template.methods.clone();
        Ok(ControlValue::plain(Value::class_instance(instance)))
    }
}

fn check_arity(name: &str, expected: usize, got: usize) -> Result<(), EvalError> {
    if got > expected {
        return Err(EvalError::TooManyArgs {
            name: name.to_string(),
            expected,
            got,
        });
    }
    if got < expected {
        return Err(EvalError::TooFewArgs {
            name: name.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

fn type_marker_value(marker: TypeMarker) -> Value {
    let name = match marker {
        TypeMarker::Int => "int",
        TypeMarker::Float => "float",
        TypeMarker::Str => "str",
        TypeMarker::Bool => "bool",
        TypeMarker::Vec => "vec",
    };
    Value::String(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_lex::Lexer;
    use glint_native::{register_builtins, NativeRegistry};
    use glint_util::Diagnostics;

    fn run(src: &str) -> Result<ControlValue, EvalError> {
        let mut diags = Diagnostics::new();
        let tokens = Lexer::new(src, "t.gln").tokenize(&mut diags);
        let mut registry = NativeRegistry::new();
        register_builtins(&mut registry);
        let program = glint_par::parse(tokens, "t.gln", vec![], &mut registry, &mut diags);
        assert!(!diags.has_errors(), "{:?}", diags.errors);
        let Node::Program(p) = program else { panic!() };
        let mut eval = Evaluator::new(&registry);
        eval.eval_program(&p)
    }

    #[test]
    fn arithmetic_precedence_is_honored() {
        let cv = run("1 + 2 * 3;").unwrap();
        assert!(matches!(cv.value, Value::Int(7)));
    }

    #[test]
    fn if_else_picks_the_right_branch() {
        let cv = run("i = 0; if 1 > 2 { i = 1; } else { i = 2; } i;").unwrap();
        assert!(matches!(cv.value, Value::Int(2)));
    }

    #[test]
    fn while_loop_accumulates() {
        let cv = run("i = 0; sum = 0; while i < 5 { sum += i; i += 1; } sum;").unwrap();
        assert!(matches!(cv.value, Value::Int(10)));
    }

    #[test]
    fn break_stops_the_loop_early() {
        let cv = run("i = 0; while 1 { if i == 3 { break; } i += 1; } i;").unwrap();
        assert!(matches!(cv.value, Value::Int(3)));
    }

    #[test]
    fn continue_skips_the_rest_of_the_body() {
        let cv = run("i = 0; sum = 0; while i < 5 { i += 1; if i == 3 { continue; } sum += i; } sum;")
            .unwrap();
        assert!(matches!(cv.value, Value::Int(12)));
    }

    #[test]
    fn loose_break_outside_a_loop_is_a_no_op() {
        let cv = run("break; 7;").unwrap();
        assert!(matches!(cv.value, Value::Int(7)));
    }

    #[test]
    fn for_loop_iterates_a_vector() {
        let cv = run("sum = 0; for x $ [1, 2, 3] { sum += x; } sum;").unwrap();
        assert!(matches!(cv.value, Value::Int(6)));
    }

    #[test]
    fn user_function_call_and_return() {
        let cv = run("form add(a, b) { return a + b; } add(2, 3);").unwrap();
        assert!(matches!(cv.value, Value::Int(5)));
    }

    #[test]
    fn inline_functions_behave_identically_to_form() {
        let cv = run("inline square(x) { return x * x; } square(4);").unwrap();
        assert!(matches!(cv.value, Value::Int(16)));
    }

    #[test]
    fn too_few_arguments_is_an_error() {
        let err = run("form add(a, b) { return a + b; } add(1);").unwrap_err();
        assert!(matches!(err, EvalError::TooFewArgs { .. }));
    }

    #[test]
    fn too_many_arguments_is_an_error() {
        let err = run("form add(a, b) { return a + b; } add(1, 2, 3);").unwrap_err();
        assert!(matches!(err, EvalError::TooManyArgs { .. }));
    }

    #[test]
    fn class_construction_binds_fields_from_constructor_params() {
        let cv = run("class Point(x, y) {} p = Point(1, 2); p.x;").unwrap();
        assert!(matches!(cv.value, Value::Int(1)));
    }

    #[test]
    fn unknown_identifier_is_reported() {
        let err = run("y;").unwrap_err();
        assert!(matches!(err, EvalError::UnknownIdentifier(n) if n == "y"));
    }

    #[test]
    fn native_function_takes_priority_over_same_named_user_function() {
        let cv = run("println(1);").unwrap();
        assert!(matches!(cv.value, Value::NullOp));
    }

    #[test]
    fn exit_short_circuits_the_program() {
        let cv = run("println(1); exit(2); println(3);").unwrap();
        assert!(cv.is_exit);
        assert!(matches!(cv.value, Value::Int(2)));
    }
}
